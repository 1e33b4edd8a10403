//! Value types shared by the engine and the enumerator.

use std::fmt;

/// Value of one variable in a cube.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Ternary {
    Zero,
    One,
    /// The variable is not tested on the path: both values are allowed.
    DontCare,
}

impl Ternary {
    pub fn is_dont_care(self) -> bool {
        self == Ternary::DontCare
    }
}

impl fmt::Display for Ternary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Ternary::Zero => '0',
            Ternary::One => '1',
            Ternary::DontCare => '-',
        };
        write!(f, "{}", c)
    }
}

/// Renders a cube in the usual `01-` notation.
pub fn cube_to_string(cube: &[Ternary]) -> String {
    cube.iter().map(|t| t.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_dont_care() {
        assert!(Ternary::DontCare.is_dont_care());
        assert!(!Ternary::One.is_dont_care());
        assert!(!Ternary::Zero.is_dont_care());
    }

    #[test]
    fn test_cube_to_string() {
        let cube = [Ternary::Zero, Ternary::DontCare, Ternary::One];
        assert_eq!(cube_to_string(&cube), "0-1");
    }
}
