//! Sound effect triggers
//!
//! The simulation never plays audio itself. It fires effects at an
//! [`AudioSink`] supplied by the platform layer and ignores the outcome.

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Entity left the ground on purpose
    Jump,
    /// Player landed on a monster
    Stomp,
    /// Treasure picked up
    Treasure,
    /// Player killed
    PlayerDeath,
    /// Monster killed by fire or falling out of the world
    MonsterDeath,
    /// Last treasure collected and exit reached
    LevelComplete,
}

impl SoundEffect {
    /// Default priority; higher values win a busy channel
    pub fn priority(self) -> u8 {
        match self {
            SoundEffect::Jump => 1,
            SoundEffect::Treasure => 2,
            SoundEffect::Stomp | SoundEffect::MonsterDeath => 3,
            SoundEffect::PlayerDeath => 4,
            SoundEffect::LevelComplete => 5,
        }
    }

    /// Whether the effect should cut off whatever is playing
    pub fn exclusive(self) -> bool {
        matches!(self, SoundEffect::PlayerDeath | SoundEffect::LevelComplete)
    }
}

/// Fire-and-forget audio interface
pub trait AudioSink {
    fn trigger_effect(&mut self, effect: SoundEffect, priority: u8, exclusive: bool);

    /// Trigger with the effect's default priority and exclusivity
    fn play(&mut self, effect: SoundEffect) {
        self.trigger_effect(effect, effect.priority(), effect.exclusive());
    }
}

/// Sink that reports effects through the `log` facade (headless runs)
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAudio;

impl AudioSink for LogAudio {
    fn trigger_effect(&mut self, effect: SoundEffect, priority: u8, exclusive: bool) {
        log::debug!("sfx {:?} (priority {}, exclusive {})", effect, priority, exclusive);
    }
}

/// Sink that keeps every triggered effect, for tests and replays
#[derive(Debug, Default, Clone)]
pub struct Recorder {
    pub effects: Vec<SoundEffect>,
}

impl AudioSink for Recorder {
    fn trigger_effect(&mut self, effect: SoundEffect, _priority: u8, _exclusive: bool) {
        self.effects.push(effect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_uses_default_priority() {
        struct Capture(Vec<(SoundEffect, u8, bool)>);
        impl AudioSink for Capture {
            fn trigger_effect(&mut self, effect: SoundEffect, priority: u8, exclusive: bool) {
                self.0.push((effect, priority, exclusive));
            }
        }

        let mut sink = Capture(Vec::new());
        sink.play(SoundEffect::Jump);
        sink.play(SoundEffect::PlayerDeath);
        assert_eq!(sink.0[0], (SoundEffect::Jump, 1, false));
        assert_eq!(sink.0[1], (SoundEffect::PlayerDeath, 4, true));
    }
}
