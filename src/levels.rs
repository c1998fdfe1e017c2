//! Hand-authored levels.
//!
//! Rows are written top-first, one string of token codes per stack, in the
//! order the stacks appear on screen. See [`crate::utils::parse_stack_row`].
use crate::engine::Puzzle;
use crate::error::ParsePuzzleError;
use crate::utils::puzzle_from_str_array;

#[derive(Clone, Copy, Debug)]
pub struct Level {
    pub name: &'static str,
    pub max_size: usize,
    pub rows: &'static [&'static str],
}

impl Level {
    /// Builds the puzzle for this level.
    pub fn to_puzzle(&self) -> Result<Puzzle, ParsePuzzleError> {
        Ok(puzzle_from_str_array(Some(self.max_size), self.rows)?.with_name(self.name))
    }
}

pub const LEVELS: &[Level] = &[
    Level {
        name: "Level 1",
        max_size: 3,
        rows: &["C", "CC"],
    },
    Level {
        name: "Level 2",
        max_size: 3,
        rows: &["KCC", "KKC", ""],
    },
    Level {
        name: "Level 3",
        max_size: 3,
        rows: &["KBK", "", "KBB"],
    },
    Level {
        name: "Level 4",
        max_size: 4,
        rows: &["CCRC", "RRCR", "", ""],
    },
    Level {
        name: "Level 5",
        max_size: 3,
        rows: &["KPC", "CKP", "PCK", "", ""],
    },
    Level {
        name: "Level 6",
        max_size: 3,
        rows: &["PGC", "", "PKK", "GKP", "", "CGC"],
    },
    Level {
        name: "Level 7",
        max_size: 3,
        rows: &["PGR", "", "", "PRG", "RKP", "KCK", "CGC"],
    },
    Level {
        name: "Level 8",
        max_size: 3,
        rows: &["BGB", "ROK", "BRC", "OGO", "CGC", "", "", "KRK"],
    },
    Level {
        name: "Level 11",
        max_size: 3,
        rows: &["RC", "G", "GCK", "RKP", "GCR", "PBB", "KBP"],
    },
    Level {
        name: "App Level 68",
        max_size: 4,
        rows: &["BGCC", "G", "RGKK", "RPP", "GKCR", "KCPB", "PRBB"],
    },
    Level {
        name: "App Level 69",
        max_size: 5,
        rows: &["KCC", "GCGG", "KGK", "RKRPP", "KCGRR", "RPCPP"],
    },
    Level {
        name: "App Level 70",
        max_size: 5,
        rows: &["PCRCC", "PRRGG", "BCBBK", "OGPP", "POORR", "KCKBB", "GO", "OGKK"],
    },
];

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Looks up a level by name, ignoring case, spaces, `-` and `_`.
///
/// `"level 4"`, `"Level4"` and `"app-level-70"` all match.
pub fn find_level(name: &str) -> Option<&'static Level> {
    let wanted = normalize(name);
    LEVELS.iter().find(|level| normalize(level.name) == wanted)
}
