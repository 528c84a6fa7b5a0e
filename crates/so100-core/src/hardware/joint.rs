//! SO-100 joint model

use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use crate::Error;

/// Number of joints in the SO-100 arm
pub const NUM_JOINTS: usize = 6;

/// One actuated degree of freedom of the arm
///
/// Declaration order is the operator's numbering: `j 1` selects
/// [`Joint::ShoulderPan`], `j 6` selects [`Joint::Gripper`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Joint {
    ShoulderPan,
    ShoulderLift,
    ElbowFlex,
    WristFlex,
    WristRoll,
    Gripper,
}

impl Joint {
    /// All joints in their fixed order
    pub const ALL: [Joint; NUM_JOINTS] = [
        Joint::ShoulderPan,
        Joint::ShoulderLift,
        Joint::ElbowFlex,
        Joint::WristFlex,
        Joint::WristRoll,
        Joint::Gripper,
    ];

    /// Motor name as used on the bus and in operator output
    pub const fn name(self) -> &'static str {
        match self {
            Joint::ShoulderPan => "shoulder_pan",
            Joint::ShoulderLift => "shoulder_lift",
            Joint::ElbowFlex => "elbow_flex",
            Joint::WristFlex => "wrist_flex",
            Joint::WristRoll => "wrist_roll",
            Joint::Gripper => "gripper",
        }
    }

    /// 0-based position in [`Joint::ALL`]
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Look up a joint by its 1-indexed operator number
    ///
    /// Returns `None` for zero, negatives and anything past [`NUM_JOINTS`].
    pub fn from_number(number: i64) -> Option<Joint> {
        let index = usize::try_from(number.checked_sub(1)?).ok()?;
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for Joint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Joint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|joint| joint.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::Config(format!("Unknown joint name: {}", s)))
    }
}

/// Last-known position of every joint, in raw servo steps
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct JointPositions([f64; NUM_JOINTS]);

impl JointPositions {
    /// All joints at 0.0
    pub fn new() -> Self {
        Self::default()
    }

    /// Iterate `(joint, position)` pairs in joint order
    pub fn iter(&self) -> impl Iterator<Item = (Joint, f64)> + '_ {
        Joint::ALL.into_iter().zip(self.0.iter().copied())
    }

    /// Positions as a slice in joint order
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

impl Index<Joint> for JointPositions {
    type Output = f64;

    fn index(&self, joint: Joint) -> &f64 {
        &self.0[joint.index()]
    }
}

impl IndexMut<Joint> for JointPositions {
    fn index_mut(&mut self, joint: Joint) -> &mut f64 {
        &mut self.0[joint.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_number_in_range() {
        for (i, joint) in Joint::ALL.iter().enumerate() {
            assert_eq!(Joint::from_number(i as i64 + 1), Some(*joint));
        }
    }

    #[test]
    fn test_from_number_out_of_range() {
        for n in [0, -1, 7, 9, i64::MIN, i64::MAX] {
            assert_eq!(Joint::from_number(n), None, "n = {}", n);
        }
    }

    #[test]
    fn test_index_matches_order() {
        for (i, joint) in Joint::ALL.iter().enumerate() {
            assert_eq!(joint.index(), i);
        }
    }

    #[test]
    fn test_name_parse() {
        assert_eq!("elbow_flex".parse::<Joint>().unwrap(), Joint::ElbowFlex);
        assert_eq!(" GRIPPER ".parse::<Joint>().unwrap(), Joint::Gripper);
        assert!("elbow".parse::<Joint>().is_err());
        assert_eq!(Joint::WristRoll.to_string(), "wrist_roll");
    }

    #[test]
    fn test_positions_default_to_zero() {
        let mut positions = JointPositions::new();
        assert!(positions.as_slice().iter().all(|&p| p == 0.0));

        positions[Joint::WristFlex] = 12.5;
        assert_eq!(positions[Joint::WristFlex], 12.5);
        assert_eq!(
            positions.iter().nth(3),
            Some((Joint::WristFlex, 12.5))
        );
    }
}
