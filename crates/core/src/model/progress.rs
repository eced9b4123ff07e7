/// Cumulative score state for one session, as reported by the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    current: u32,
    xp: u32,
    streak: u32,
}

/// Authoritative progress figures attached to a submit response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub current: Option<u32>,
    pub xp: Option<u32>,
    pub streak: Option<u32>,
}

impl Progress {
    /// Index of the next chunk to clear.
    #[must_use]
    pub fn current(&self) -> u32 {
        self.current
    }

    #[must_use]
    pub fn xp(&self) -> u32 {
        self.xp
    }

    #[must_use]
    pub fn streak(&self) -> u32 {
        self.streak
    }

    /// Fold server figures into the progress.
    ///
    /// `current` never moves backwards and never passes `total_chunks`;
    /// `xp` and `streak` are taken as-is when present (a streak may reset).
    pub fn apply(&mut self, update: ProgressUpdate, total_chunks: u32) {
        if let Some(current) = update.current {
            self.current = self.current.max(current);
        }
        self.current = self.current.min(total_chunks);
        if let Some(xp) = update.xp {
            self.xp = xp;
        }
        if let Some(streak) = update.streak {
            self.streak = streak;
        }
    }

    /// Fraction of the document cleared, in `[0, 1]`.
    #[must_use]
    pub fn ratio(&self, total_chunks: u32) -> f64 {
        if total_chunks == 0 {
            return 0.0;
        }
        f64::from(self.current) / f64::from(total_chunks)
    }
}
