/// Scrub / play cursor over a timeline's frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelinePlayer {
    frame_count: usize,
    cursor: usize,
    playing: bool,
    looping: bool,
}

impl TimelinePlayer {
    pub fn new(frame_count: usize) -> Self {
        Self {
            frame_count,
            cursor: 0,
            playing: false,
            looping: false,
        }
    }

    /// Index of the frame on screen, `None` for an empty timeline.
    pub fn current(&self) -> Option<usize> {
        (self.frame_count > 0).then_some(self.cursor)
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    /// Points the player at a rebuilt timeline, keeping the cursor in range.
    pub fn reset(&mut self, frame_count: usize) {
        self.frame_count = frame_count;
        self.cursor = self.cursor.min(frame_count.saturating_sub(1));
        if frame_count == 0 {
            self.playing = false;
        }
    }

    pub fn seek(&mut self, index: usize) {
        self.cursor = index.min(self.frame_count.saturating_sub(1));
    }

    pub fn step_forward(&mut self) -> bool {
        if self.cursor + 1 < self.frame_count {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    pub fn step_back(&mut self) -> bool {
        if self.cursor > 0 {
            self.cursor -= 1;
            true
        } else {
            false
        }
    }

    /// Starts playback; from the last frame it starts over.
    pub fn play(&mut self) {
        if self.frame_count == 0 {
            return;
        }
        if self.cursor + 1 >= self.frame_count {
            self.cursor = 0;
        }
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn toggle(&mut self) {
        if self.playing {
            self.pause();
        } else {
            self.play();
        }
    }

    pub fn restart(&mut self) {
        self.cursor = 0;
    }

    /// Advances one frame while playing. Stops on the last frame unless looping.
    pub fn tick(&mut self) {
        if !self.playing {
            return;
        }
        if !self.step_forward() {
            if self.looping && self.frame_count > 1 {
                self.cursor = 0;
            } else {
                self.playing = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_player_has_no_current_frame() {
        let mut player = TimelinePlayer::new(0);
        player.play();
        assert_eq!(player.current(), None);
        assert!(!player.is_playing());
    }

    #[test]
    fn playback_stops_on_last_frame() {
        let mut player = TimelinePlayer::new(3);
        player.play();
        player.tick();
        player.tick();
        assert_eq!(player.current(), Some(2));
        assert!(player.is_playing());
        player.tick();
        assert_eq!(player.current(), Some(2));
        assert!(!player.is_playing());
    }

    #[test]
    fn play_from_end_restarts() {
        let mut player = TimelinePlayer::new(4);
        player.seek(10);
        assert_eq!(player.current(), Some(3));
        player.play();
        assert_eq!(player.current(), Some(0));
    }

    #[test]
    fn looping_wraps_around() {
        let mut player = TimelinePlayer::new(2);
        player.set_looping(true);
        player.play();
        player.tick();
        player.tick();
        assert_eq!(player.current(), Some(0));
        assert!(player.is_playing());
    }

    #[test]
    fn toggle_switches_between_play_and_pause() {
        let mut player = TimelinePlayer::new(3);
        player.toggle();
        assert!(player.is_playing());
        player.tick();
        player.toggle();
        assert!(!player.is_playing());
        player.tick();
        assert_eq!(player.current(), Some(1));
    }

    #[test]
    fn restart_returns_to_first_frame_and_keeps_playing() {
        let mut player = TimelinePlayer::new(5);
        player.play();
        player.tick();
        player.tick();
        player.restart();
        assert_eq!(player.current(), Some(0));
        assert!(player.is_playing());
    }

    #[test]
    fn reset_clamps_cursor() {
        let mut player = TimelinePlayer::new(10);
        player.seek(8);
        player.reset(3);
        assert_eq!(player.current(), Some(2));
        player.step_back();
        player.step_back();
        assert!(!player.step_back());
        assert_eq!(player.current(), Some(0));
    }
}
