// Environment registry - central place to register playable environments.
//
// Each entry couples an environment id with the number of players a game
// needs and a factory producing a fresh rules instance. Meta-environments
// pick a concrete variant per game, which is what ends up in the Game row's
// `specific_env_id`.

use std::collections::HashMap;

use rand::seq::IndexedRandom;

use crate::config::DEFAULT_ENV_ID;
use crate::errors::AppError;
use crate::games::nim::{self, NIM_ENV_ID};
use crate::games::{GameRules, RulesFactory};

/// Registered environment: player count plus rules factory.
#[derive(Clone)]
pub struct EnvSpec {
    pub environment_id: &'static str,
    pub num_players: i32,
    pub factory: RulesFactory,
}

pub struct EnvRegistry {
    specs: HashMap<&'static str, EnvSpec>,
}

impl EnvRegistry {
    pub fn get(&self, environment_id: &str) -> Option<&EnvSpec> {
        self.specs.get(environment_id)
    }

    /// Instantiate a fresh rules engine for the given environment.
    pub fn make_rules(&self, environment_id: &str) -> Result<Box<dyn GameRules>, AppError> {
        let spec = self
            .get(environment_id)
            .ok_or_else(|| AppError::EnvError(format!("Unknown environment: {}", environment_id)))?;
        Ok((spec.factory)())
    }

    pub fn all(&self) -> impl Iterator<Item = &EnvSpec> {
        self.specs.values()
    }
}

/// Concrete (non-meta) environment factories the arcade picks from.
const ARCADE_VARIANTS: &[RulesFactory] = &[nim::create_nim];

fn create_arcade() -> Box<dyn GameRules> {
    let factory = ARCADE_VARIANTS
        .choose(&mut rand::rng())
        .expect("arcade variant list is non-empty");
    factory()
}

/// Build the environment registry with all registered environments.
///
/// New games are added by defining an env id constant, inserting the factory
/// here, and (for two-player turn games) appending it to `ARCADE_VARIANTS`.
pub fn create_env_registry() -> EnvRegistry {
    let mut specs: HashMap<&'static str, EnvSpec> = HashMap::new();

    specs.insert(
        NIM_ENV_ID,
        EnvSpec {
            environment_id: NIM_ENV_ID,
            num_players: nim::NUM_PLAYERS as i32,
            factory: nim::create_nim,
        },
    );

    // Meta-environment: a fresh game gets a randomly chosen concrete
    // variant. Humans queue here by default.
    specs.insert(
        DEFAULT_ENV_ID,
        EnvSpec {
            environment_id: DEFAULT_ENV_ID,
            num_players: 2,
            factory: create_arcade,
        },
    );

    EnvRegistry { specs }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_contains_default_env() {
        let registry = create_env_registry();
        assert!(registry.get(DEFAULT_ENV_ID).is_some());
        assert!(registry.get(NIM_ENV_ID).is_some());
        assert!(registry.get("NoSuchGame-v9").is_none());
    }

    #[test]
    fn arcade_resolves_to_a_concrete_variant() {
        let registry = create_env_registry();
        let rules = registry.make_rules(DEFAULT_ENV_ID).unwrap();
        assert_eq!(rules.specific_env_id(), NIM_ENV_ID);
    }
}
