use log::debug;

/// Named sound cues. Each maps to one discrete game event and is played at
/// most once per event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SoundCue {
    PlayerFire,
    EnemyFire,
    PlayerExplosion,
    EnemyExplosion,
    AsteroidExplosion,
    Thrust,
    Hyperspace,
}

/// Audio collaborator. Mixing is out of the core's hands; the default sink
/// just logs, since a raw-mode terminal has no mixer to speak of.
pub trait CueSink {
    fn play(&mut self, cue: SoundCue);
}

pub struct LogSink {
    effects_volume: f64,
}

impl LogSink {
    pub fn new(effects_volume: f64) -> Self {
        LogSink { effects_volume }
    }
}

impl CueSink for LogSink {
    fn play(&mut self, cue: SoundCue) {
        debug!("cue {:?} at volume {:.1}", cue, self.effects_volume);
    }
}

/// Records every cue in order. Used by tests to assert the
/// once-per-event property.
#[derive(Default)]
pub struct RecordingSink {
    pub played: Vec<SoundCue>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, cue: SoundCue) -> usize {
        self.played.iter().filter(|&&c| c == cue).count()
    }
}

impl CueSink for RecordingSink {
    fn play(&mut self, cue: SoundCue) {
        self.played.push(cue);
    }
}
