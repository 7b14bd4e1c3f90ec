//! Gene - One half of an entity's genetic profile
//!
//! A Gene is a Value Object: two genes with the same stats and sex are
//! the same gene. Every stat uses a dual encoding:
//!
//! - `>= 0` is an absolute ability score
//! - `< 0` is a suppressor whose magnitude multiplies the partner's score

/// Sex marker carried by every gene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Sex {
    X,
    Y,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::X => "X",
            Sex::Y => "Y",
        }
    }

    /// Parse from the single-letter symbol
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "X" => Some(Sex::X),
            "Y" => Some(Sex::Y),
            _ => None,
        }
    }
}

impl core::fmt::Display for Sex {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The six stats, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stat {
    Strength,
    Constitution,
    Dexterity,
    Charisma,
    Wisdom,
    Intelligence,
}

impl Stat {
    pub const ALL: [Stat; 6] = [
        Stat::Strength,
        Stat::Constitution,
        Stat::Dexterity,
        Stat::Charisma,
        Stat::Wisdom,
        Stat::Intelligence,
    ];

    pub fn abbreviation(&self) -> &'static str {
        match self {
            Stat::Strength => "str",
            Stat::Constitution => "con",
            Stat::Dexterity => "dex",
            Stat::Charisma => "chr",
            Stat::Wisdom => "wis",
            Stat::Intelligence => "int",
        }
    }

    fn index(&self) -> usize {
        match self {
            Stat::Strength => 0,
            Stat::Constitution => 1,
            Stat::Dexterity => 2,
            Stat::Charisma => 3,
            Stat::Wisdom => 4,
            Stat::Intelligence => 5,
        }
    }
}

/// Six stats plus a sex marker
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gene {
    stats: [f64; 6],
    sex: Sex,
}

impl Gene {
    /// Create a gene from stats in `Stat::ALL` order
    pub fn new(stats: [f64; 6], sex: Sex) -> Self {
        Self { stats, sex }
    }

    // ========== Getters ==========

    pub fn stat(&self, stat: Stat) -> f64 {
        self.stats[stat.index()]
    }

    pub fn stats(&self) -> [f64; 6] {
        self.stats
    }

    pub fn sex(&self) -> Sex {
        self.sex
    }

    /// Sum of absolute values across all six stats
    pub fn magnitude(&self) -> f64 {
        self.stats.iter().map(|s| s.abs()).sum()
    }

    /// A gene is well-formed when every stat is a finite number
    pub fn validate(&self) -> Result<(), GeneError> {
        match Stat::ALL.iter().find(|s| !self.stat(**s).is_finite()) {
            Some(stat) => Err(GeneError::InvalidOperands {
                reason: format!("{} is not a finite number", stat.abbreviation()),
            }),
            None => Ok(()),
        }
    }

    /// Combine two genes into the trait they express together.
    ///
    /// Per stat: two suppressors keep the stronger one (or collapse to 1
    /// when equal), one suppressor multiplies the other side's score, two
    /// scores keep the higher. Sex follows the operand with the larger
    /// magnitude; ties go to `other`.
    pub fn combine(&self, other: &Gene) -> Result<Gene, GeneError> {
        self.validate()?;
        other.validate()?;

        let mut stats = [0.0; 6];
        for (i, slot) in stats.iter_mut().enumerate() {
            *slot = combine_stat(self.stats[i], other.stats[i]);
        }

        let sex = if self.magnitude() > other.magnitude() {
            self.sex
        } else {
            other.sex
        };

        Ok(Gene { stats, sex })
    }
}

fn combine_stat(one: f64, two: f64) -> f64 {
    match (one < 0.0, two < 0.0) {
        (true, true) => {
            if one == two {
                1.0
            } else {
                one.min(two)
            }
        }
        (true, false) => one.abs() * two,
        (false, true) => two.abs() * one,
        (false, false) => one.max(two),
    }
}

impl core::fmt::Display for Gene {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for stat in Stat::ALL {
            let value = self.stat(stat);
            if value < 0.0 {
                write!(f, "{}: x{:.1} ", stat.abbreviation(), value.abs())?;
            } else {
                write!(f, "{}: {:.1} ", stat.abbreviation(), value)?;
            }
        }
        write!(f, "sex: {}", self.sex)
    }
}

/// Errors raised by gene operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneError {
    /// One of the operands is not a well-formed gene
    InvalidOperands { reason: String },
}

impl core::fmt::Display for GeneError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            GeneError::InvalidOperands { reason } => {
                write!(f, "Invalid gene operands: {}", reason)
            }
        }
    }
}

impl std::error::Error for GeneError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn gene_a() -> Gene {
        Gene::new([10.0, -2.0, 5.0, 8.0, 3.0, 12.0], Sex::X)
    }

    fn gene_b() -> Gene {
        Gene::new([8.0, 4.0, -3.0, 8.0, 15.0, 1.0], Sex::Y)
    }

    #[test]
    fn test_combine_worked_example() {
        let combined = gene_a().combine(&gene_b()).unwrap();

        assert_eq!(combined.stats(), [10.0, 8.0, 15.0, 8.0, 15.0, 12.0]);
        // |A| = 40 beats |B| = 39
        assert_eq!(combined.sex(), Sex::X);
    }

    #[test]
    fn test_positive_stats_take_maximum_both_ways() {
        let a = Gene::new([3.0, 18.0, 7.0, 0.0, 9.0, 4.0], Sex::X);
        let b = Gene::new([5.0, 2.0, 7.0, 6.0, 11.0, 3.0], Sex::Y);

        let ab = a.combine(&b).unwrap();
        let ba = b.combine(&a).unwrap();

        for stat in Stat::ALL {
            let expected = a.stat(stat).max(b.stat(stat));
            assert_eq!(ab.stat(stat), expected);
            assert_eq!(ba.stat(stat), expected);
        }
    }

    #[test]
    fn test_two_suppressors() {
        let a = Gene::new([-1.5, -2.0, -2.5, -1.5, 4.0, 4.0], Sex::X);
        let b = Gene::new([-1.5, -2.5, -1.5, -2.0, 4.0, 4.0], Sex::Y);

        let combined = a.combine(&b).unwrap();

        // Equal suppressors collapse to 1
        assert_eq!(combined.stat(Stat::Strength), 1.0);
        // Otherwise the more negative one wins
        assert_eq!(combined.stat(Stat::Constitution), -2.5);
        assert_eq!(combined.stat(Stat::Dexterity), -2.5);
        assert_eq!(combined.stat(Stat::Charisma), -2.0);
    }

    #[test]
    fn test_single_suppressor_multiplies() {
        let a = Gene::new([-2.5, 6.0, 3.0, 3.0, 3.0, 3.0], Sex::X);
        let b = Gene::new([4.0, -1.5, 3.0, 3.0, 3.0, 3.0], Sex::X);

        let combined = a.combine(&b).unwrap();

        assert_eq!(combined.stat(Stat::Strength), 10.0);
        assert_eq!(combined.stat(Stat::Constitution), 9.0);
        assert_eq!(b.combine(&a).unwrap().stat(Stat::Strength), 10.0);
    }

    #[test]
    fn test_sex_tie_goes_to_second_operand() {
        let a = Gene::new([3.0; 6], Sex::X);
        let b = Gene::new([-3.0, 3.0, 3.0, 3.0, 3.0, 3.0], Sex::Y);

        assert_eq!(a.magnitude(), b.magnitude());
        assert_eq!(a.combine(&b).unwrap().sex(), Sex::Y);
        assert_eq!(b.combine(&a).unwrap().sex(), Sex::X);
    }

    #[test]
    fn test_combine_rejects_non_finite_stats() {
        let broken = Gene::new([f64::NAN, 3.0, 3.0, 3.0, 3.0, 3.0], Sex::X);

        let err = gene_a().combine(&broken).unwrap_err();
        assert!(matches!(err, GeneError::InvalidOperands { .. }));
        assert!(broken.combine(&gene_a()).is_err());
    }

    #[test]
    fn test_display_marks_suppressors() {
        assert_eq!(
            gene_a().to_string(),
            "str: 10.0 con: x2.0 dex: 5.0 chr: 8.0 wis: 3.0 int: 12.0 sex: X"
        );
    }

    #[test]
    fn test_sex_symbols() {
        assert_eq!(Sex::from_symbol("Y"), Some(Sex::Y));
        assert_eq!(Sex::from_symbol("Z"), None);
        assert_eq!(Sex::X.to_string(), "X");
    }
}
