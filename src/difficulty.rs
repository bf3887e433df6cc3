//! Difficulty presets and validated custom configurations.

/// An immutable bundle of board parameters.
///
/// `lives` here is always the concrete cushion the board starts with; the
/// "0 means derive a default" overload exists only at the [`Difficulty::custom`]
/// entry point. A `Board` built with `lives = 0` is hardcore: any mine hit
/// ends the game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Difficulty {
    pub rows: usize,
    pub cols: usize,
    pub mines: usize,
    pub lives: u32,
    pub name: String,
    pub description: String,
}

impl Difficulty {
    /// The classic 9x9 board with 10 mines.
    pub fn beginner() -> Self {
        Difficulty {
            rows: 9,
            cols: 9,
            mines: 10,
            lives: derive_default_lives(9, 9, 10),
            name: "Beginner".to_string(),
            description: "9x9 board, 10 mines".to_string(),
        }
    }

    /// The classic 16x16 board with 40 mines.
    pub fn intermediate() -> Self {
        Difficulty {
            rows: 16,
            cols: 16,
            mines: 40,
            lives: derive_default_lives(16, 16, 40),
            name: "Intermediate".to_string(),
            description: "16x16 board, 40 mines".to_string(),
        }
    }

    /// The classic 16x30 board with 99 mines.
    pub fn expert() -> Self {
        Difficulty {
            rows: 16,
            cols: 30,
            mines: 99,
            lives: derive_default_lives(16, 30, 99),
            name: "Expert".to_string(),
            description: "16x30 board, 99 mines".to_string(),
        }
    }

    /// Builds a validated custom difficulty.
    ///
    /// Bounds: rows in [5,30], cols in [5,50], mines in [1, rows*cols - 9]
    /// (nine cells are reserved for the first-click safe opening), lives >= 0.
    ///
    /// At this entry point `lives = 0` means "unspecified" and a default is
    /// derived from mine density. Use [`Difficulty::custom_hardcore`] to get a
    /// literal zero-lives game.
    pub fn custom(rows: usize, cols: usize, mines: usize, lives: u32) -> anyhow::Result<Self> {
        validate(rows, cols, mines)?;
        let lives = if lives == 0 {
            derive_default_lives(rows, cols, mines)
        } else {
            lives
        };
        Ok(Difficulty {
            rows,
            cols,
            mines,
            lives,
            name: "Custom".to_string(),
            description: format!("{}x{} board, {} mines", rows, cols, mines),
        })
    }

    /// Builds a validated custom difficulty with no lives cushion.
    pub fn custom_hardcore(rows: usize, cols: usize, mines: usize) -> anyhow::Result<Self> {
        validate(rows, cols, mines)?;
        Ok(Difficulty {
            rows,
            cols,
            mines,
            lives: 0,
            name: "Custom (hardcore)".to_string(),
            description: format!("{}x{} board, {} mines, no lives", rows, cols, mines),
        })
    }
}

fn validate(rows: usize, cols: usize, mines: usize) -> anyhow::Result<()> {
    if !(5..=30).contains(&rows) {
        anyhow::bail!("rows must be between 5 and 30, got {}", rows);
    }
    if !(5..=50).contains(&cols) {
        anyhow::bail!("cols must be between 5 and 50, got {}", cols);
    }
    let max_mines = rows * cols - 9;
    if mines < 1 || mines > max_mines {
        anyhow::bail!("mines must be between 1 and {}, got {}", max_mines, mines);
    }
    Ok(())
}

/// Derives a default lives count from mine density.
///
/// Sparse boards get a thin cushion, dense boards a thicker one, scaled by
/// the absolute mine count so huge boards are not trivialized.
pub fn derive_default_lives(rows: usize, cols: usize, mines: usize) -> u32 {
    let density = mines as f64 / (rows * cols) as f64;
    let lives = if density < 0.15 {
        (mines / 5).max(1)
    } else if density < 0.25 {
        (mines / 8).max(3)
    } else {
        (mines / 12).max(5)
    };
    lives as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        for d in [
            Difficulty::beginner(),
            Difficulty::intermediate(),
            Difficulty::expert(),
        ] {
            assert!(d.mines <= d.rows * d.cols - 9);
            assert!(d.lives > 0);
        }
    }

    #[test]
    fn test_custom_bounds() {
        assert!(Difficulty::custom(5, 5, 1, 1).is_ok());
        assert!(Difficulty::custom(30, 50, 30 * 50 - 9, 1).is_ok());

        // Each bound violated in turn.
        assert!(Difficulty::custom(4, 10, 5, 1).is_err());
        assert!(Difficulty::custom(31, 10, 5, 1).is_err());
        assert!(Difficulty::custom(10, 4, 5, 1).is_err());
        assert!(Difficulty::custom(10, 51, 5, 1).is_err());
        assert!(Difficulty::custom(10, 10, 0, 1).is_err());
        assert!(Difficulty::custom(10, 10, 92, 1).is_err());
    }

    #[test]
    fn test_custom_derives_lives_when_zero() {
        let d = Difficulty::custom(9, 9, 10, 0).unwrap();
        assert_eq!(d.lives, derive_default_lives(9, 9, 10));

        // An explicit lives count is kept as-is.
        let d = Difficulty::custom(9, 9, 10, 7).unwrap();
        assert_eq!(d.lives, 7);
    }

    #[test]
    fn test_hardcore_keeps_zero_lives() {
        let d = Difficulty::custom_hardcore(9, 9, 10).unwrap();
        assert_eq!(d.lives, 0);
    }

    #[test]
    fn test_lives_derivation_by_density() {
        // 10/81 = 0.123 -> sparse branch: max(1, 10/5) = 2
        assert_eq!(derive_default_lives(9, 9, 10), 2);
        // 40/256 = 0.156 -> medium branch: max(3, 40/8) = 5
        assert_eq!(derive_default_lives(16, 16, 40), 5);
        // 8/25 = 0.32 -> dense branch: max(5, 8/12) = 5
        assert_eq!(derive_default_lives(5, 5, 8), 5);
        // Sparse floor: 2 mines on a big board still grants 1 life.
        assert_eq!(derive_default_lives(20, 20, 2), 1);
    }
}
