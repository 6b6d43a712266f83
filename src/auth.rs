// Participant authentication for agent endpoints.
//
// Agents authenticate every call with their (name, token) pair; the token
// is minted once at registration. Humans are authenticated by source IP in
// the human handlers instead.

use rand::Rng;
use sqlx::PgPool;

use crate::db::participant::ParticipantRepository;
use crate::errors::AppError;
use crate::models::db::Participant;

/// Mint a participant token: 16 random bytes, hex-encoded.
pub fn generate_token() -> String {
    let mut bytes = [0u8; 16];
    rand::rng().fill(&mut bytes);
    hex::encode(bytes)
}

/// Resolve a (name, token) pair to its participant or fail with the same
/// 404 for unknown names and wrong tokens.
pub async fn authenticate_agent(
    pool: &PgPool,
    name: &str,
    token: &str,
) -> Result<Participant, AppError> {
    ParticipantRepository::new(pool.clone())
        .find_by_credentials(name, token)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_32_hex_chars() {
        let token = generate_token();
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn tokens_are_unique_enough() {
        assert_ne!(generate_token(), generate_token());
    }
}
