//! Breeding - How new genes and offspring come into the world
//!
//! Pure rules only: nothing here persists or enqueues. The use-case layer
//! decides where an offspring goes once it exists.

use crate::model::entity::{Entity, EntityError, Soul};
use crate::model::gene::{Gene, GeneError, Sex};
use crate::service::dice::Dice;

/// Roll one stat.
///
/// Half the time an absolute score in `[3, U]` with `U` itself rolled in
/// `[3, 18]`, which skews scores low. Otherwise a suppressor of `-1.5`,
/// `-2.0` or `-2.5`.
pub fn random_stat(dice: &dyn Dice) -> f64 {
    if dice.coin() == 0 {
        let upper = dice.roll(3, 18);
        dice.roll(3, upper) as f64
    } else {
        -0.5 * dice.roll(3, 5) as f64
    }
}

pub fn random_gene(dice: &dyn Dice) -> Gene {
    let mut stats = [0.0; 6];
    for slot in stats.iter_mut() {
        *slot = random_stat(dice);
    }
    let sex = if dice.coin() == 0 { Sex::X } else { Sex::Y };
    Gene::new(stats, sex)
}

pub fn random_genes(dice: &dyn Dice) -> [Gene; 2] {
    [random_gene(dice), random_gene(dice)]
}

/// A fresh offspring with random genes and a single parent
pub fn adopt_offspring(owner: &Entity, dice: &dyn Dice) -> Result<Entity, BreedError> {
    if !owner.is_claimed() {
        return Err(BreedError::NoSoulAvailable);
    }
    Ok(Entity::offspring(random_genes(dice), [owner.soul()])?)
}

/// An offspring inheriting one whole gene from each side.
///
/// Two unclaimed entities cannot reproduce. An unclaimed side still
/// contributes a gene but is not recorded as a parent.
pub fn pair_offspring(a: &Entity, b: &Entity, dice: &dyn Dice) -> Result<Entity, BreedError> {
    if !a.is_claimed() && !b.is_claimed() {
        return Err(BreedError::NoSoulAvailable);
    }
    for gene in a.genes().iter().chain(b.genes().iter()) {
        gene.validate()?;
    }

    let genes = [a.genes()[dice.coin()], b.genes()[dice.coin()]];
    let parents: Vec<Soul> = [a.soul(), b.soul()]
        .into_iter()
        .filter(|s| !s.is_unclaimed())
        .collect();

    Ok(Entity::offspring(genes, parents)?)
}

/// Errors raised while producing offspring
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BreedError {
    /// Neither side has an owner
    NoSoulAvailable,
    /// Malformed gene data on one of the sides
    InvalidOperands(GeneError),
    /// The offspring would break an entity invariant
    InvalidEntity(EntityError),
}

impl From<GeneError> for BreedError {
    fn from(e: GeneError) -> Self {
        BreedError::InvalidOperands(e)
    }
}

impl From<EntityError> for BreedError {
    fn from(e: EntityError) -> Self {
        BreedError::InvalidEntity(e)
    }
}

impl core::fmt::Display for BreedError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BreedError::NoSoulAvailable => {
                write!(f, "Nameless entities cannot reproduce")
            }
            BreedError::InvalidOperands(e) => write!(f, "{}", e),
            BreedError::InvalidEntity(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for BreedError {}
