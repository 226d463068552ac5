//! Global field state

use std::collections::HashMap;

use super::conditions::{FieldEffect, Terrain, Weather};

/// Global field state affecting all Pokemon
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldState {
    /// Current weather condition
    pub weather: Option<Weather>,
    /// Estimated turns of weather left
    pub weather_turns: Option<u8>,

    /// Current terrain
    pub terrain: Option<Terrain>,
    pub terrain_turns: Option<u8>,

    /// Rooms, Gravity and the like with estimated turns left
    pub effects: HashMap<FieldEffect, u8>,

    /// Neutralizing Gas is suppressing every ability
    pub neutralizing_gas: bool,
}

impl FieldState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a weather announcement; upkeep messages keep the running estimate
    pub fn set_weather(&mut self, weather: &str, upkeep: bool) {
        let parsed = Weather::from_protocol(weather);
        if upkeep && parsed.is_some() && parsed == self.weather {
            return;
        }
        self.weather = parsed;
        self.weather_turns = parsed.and_then(|w| w.default_duration());
    }

    pub fn has_effect(&self, effect: FieldEffect) -> bool {
        self.effects.contains_key(&effect)
    }

    /// Apply a field start condition from protocol
    pub fn apply_field_start(&mut self, condition: &str) {
        if let Some(terrain) = Terrain::from_protocol(condition) {
            self.terrain = Some(terrain);
            self.terrain_turns = Some(5);
        } else if let Some(effect) = FieldEffect::from_protocol(condition) {
            self.effects.insert(effect, effect.default_duration());
        } else if Weather::from_protocol(condition).is_some() {
            self.set_weather(condition, false);
        }
    }

    /// Apply a field end condition from protocol
    pub fn apply_field_end(&mut self, condition: &str) {
        if let Some(terrain) = Terrain::from_protocol(condition) {
            if self.terrain == Some(terrain) {
                self.terrain = None;
                self.terrain_turns = None;
            }
        } else if let Some(effect) = FieldEffect::from_protocol(condition) {
            self.effects.remove(&effect);
        }
    }

    /// Count every estimate down by one turn; the host announces the actual ends
    pub fn decrement(&mut self) {
        for turns in [&mut self.weather_turns, &mut self.terrain_turns]
            .into_iter()
            .flatten()
        {
            *turns = turns.saturating_sub(1);
        }
        for turns in self.effects.values_mut() {
            *turns = turns.saturating_sub(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_field_is_empty() {
        let field = FieldState::new();
        assert!(field.weather.is_none());
        assert!(field.terrain.is_none());
        assert!(field.effects.is_empty());
        assert!(!field.neutralizing_gas);
    }

    #[test]
    fn test_weather_and_upkeep() {
        let mut field = FieldState::new();
        field.set_weather("RainDance", false);
        assert_eq!(field.weather, Some(Weather::Rain));
        assert_eq!(field.weather_turns, Some(5));

        field.decrement();
        field.set_weather("RainDance", true);
        assert_eq!(field.weather_turns, Some(4));

        field.set_weather("none", false);
        assert!(field.weather.is_none());
        assert!(field.weather_turns.is_none());

        field.set_weather("DesolateLand", false);
        assert_eq!(field.weather_turns, None);
    }

    #[test]
    fn test_apply_field_start_and_end() {
        let mut field = FieldState::new();
        field.apply_field_start("move: Electric Terrain");
        assert_eq!(field.terrain, Some(Terrain::Electric));
        assert_eq!(field.terrain_turns, Some(5));

        field.apply_field_start("move: Trick Room");
        assert!(field.has_effect(FieldEffect::TrickRoom));

        field.apply_field_end("move: Trick Room");
        assert!(!field.has_effect(FieldEffect::TrickRoom));

        // Ending a terrain that isn't up changes nothing
        field.apply_field_end("Misty Terrain");
        assert_eq!(field.terrain, Some(Terrain::Electric));

        field.apply_field_end("Electric Terrain");
        assert!(field.terrain.is_none());
    }

    #[test]
    fn test_decrement_saturates() {
        let mut field = FieldState::new();
        field.apply_field_start("Ion Deluge");
        field.decrement();
        field.decrement();
        assert_eq!(field.effects[&FieldEffect::IonDeluge], 0);
    }
}
