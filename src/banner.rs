//! Celebration shown when the last open task is marked done.

pub const COMPLETION_BANNER: &str = r"______________________
| Yayy you've finished |
| all the tasks!!!     |
|______________________|
 \/
   /\___/\
  ( U w U )
    > ^ <";

/// Banner split into lines, for the TUI popup.
pub fn banner_lines() -> impl Iterator<Item = &'static str> {
    COMPLETION_BANNER.lines()
}

/// Width of the widest banner line.
pub fn banner_width() -> usize {
    banner_lines().map(|l| l.chars().count()).max().unwrap_or(0)
}
