/// Side effect a session component asks the media element to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaCommand {
    Pause,
    Play,
}

/// The playing media element, as seen by the session.
pub trait MediaPlayer: Send + Sync {
    fn pause(&self);
    fn play(&self);
}

impl MediaCommand {
    pub fn apply(self, player: &dyn MediaPlayer) {
        match self {
            MediaCommand::Pause => player.pause(),
            MediaCommand::Play => player.play(),
        }
    }
}

/// Player for setups that have nothing to drive.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetachedPlayer;

impl MediaPlayer for DetachedPlayer {
    fn pause(&self) {}
    fn play(&self) {}
}
