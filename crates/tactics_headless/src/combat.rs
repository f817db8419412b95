//! A simple stat-based combat resolver for headless play.
//!
//! Damage is attack minus defense, where defense includes the defender's
//! tile bonus and any active buffs. Every hit lands and deals at least one
//! point. A surviving defender strikes back when the attacker stands inside
//! its weapon range.

use tactics_core::prelude::*;

/// Deterministic exchange of blows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatCombat {
    /// Exchanges resolved so far.
    pub exchanges: u32,
    /// Total damage dealt by all parties.
    pub damage_dealt: u64,
}

impl StatCombat {
    /// Create a resolver.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            exchanges: 0,
            damage_dealt: 0,
        }
    }
}

/// Damage `attacker` deals to `defender` standing on its current cell.
#[must_use]
pub fn strike(level: &Level, attacker: &Unit, defender: &Unit) -> u32 {
    let terrain = level
        .map()
        .get(defender.position)
        .map_or(0, |cell| cell.stats.defense);
    let power = i64::from(attacker.attack) + i64::from(attacker.buff_bonus(Stat::Attack));
    let guard = i64::from(defender.defense)
        + i64::from(defender.buff_bonus(Stat::Defense))
        + i64::from(terrain);
    u32::try_from((power - guard).max(1)).unwrap_or(u32::MAX)
}

impl CombatResolver for StatCombat {
    fn resolve(&mut self, level: &Level, attacker: UnitId, defender: Position) -> CombatOutcome {
        let (Some(att), Some(def)) = (level.unit(attacker), level.unit_at(defender)) else {
            tracing::warn!(%attacker, %defender, "Combat requested without both parties");
            return CombatOutcome {
                attacker_health: level.unit(attacker).map_or(0, |u| u.health),
                defender_health: level.unit_at(defender).map_or(0, |u| u.health),
            };
        };

        self.exchanges += 1;
        let hit = strike(level, att, def);
        let defender_health = def.health.saturating_sub(hit);
        self.damage_dealt += u64::from(def.health - defender_health);

        let mut attacker_health = att.health;
        if defender_health > 0 && def.range.contains(def.position.distance(att.position)) {
            let counter = strike(level, def, att);
            attacker_health = att.health.saturating_sub(counter);
            self.damage_dealt += u64::from(att.health - attacker_health);
        }

        tracing::debug!(
            attacker = %att.name,
            defender = %def.name,
            hit,
            defender_health,
            attacker_health,
            "Exchange resolved"
        );
        CombatOutcome {
            attacker_health,
            defender_health,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn duel(defender_tile: TileType) -> (Level, UnitId, UnitId) {
        let mut grid = Grid::new(3, 1);
        grid.set_tile(
            Position::new(1, 0),
            defender_tile,
            defender_tile.default_stats(),
        )
        .unwrap();
        let mut level = Level::new(grid);
        let a = level
            .spawn(
                Unit::new("Axe", Faction::Enemy, 20, 4).with_combat(9, 2),
                Position::new(0, 0),
            )
            .unwrap();
        let d = level
            .spawn(
                Unit::new("Shield", Faction::Ally, 20, 4).with_combat(5, 3),
                Position::new(1, 0),
            )
            .unwrap();
        (level, a, d)
    }

    #[test]
    fn test_exchange_with_counter() {
        let (level, a, _) = duel(TileType::Floor);
        let mut combat = StatCombat::new();
        let outcome = combat.resolve(&level, a, Position::new(1, 0));

        assert_eq!(outcome.defender_health, 14);
        assert_eq!(outcome.attacker_health, 17);
        assert_eq!(combat.exchanges, 1);
        assert_eq!(combat.damage_dealt, 9);
    }

    #[test]
    fn test_terrain_defense_reduces_damage() {
        let (level, a, _) = duel(TileType::Fort);
        let outcome = StatCombat::new().resolve(&level, a, Position::new(1, 0));
        assert_eq!(outcome.defender_health, 16);
    }

    #[test]
    fn test_minimum_damage_is_one() {
        let (level, _, d) = duel(TileType::Floor);
        let defender = level.unit(d).unwrap();
        let mut weak = defender.clone();
        weak.attack = 0;
        assert_eq!(strike(&level, &weak, level.unit_at(Position::new(0, 0)).unwrap()), 1);
    }

    #[test]
    fn test_no_counter_from_out_of_range() {
        let mut level = Level::new(Grid::new(4, 1));
        let bow = level
            .spawn(
                Unit::new("Bow", Faction::Enemy, 15, 4)
                    .with_range(2, 2)
                    .with_combat(6, 0),
                Position::new(0, 0),
            )
            .unwrap();
        level
            .spawn(
                Unit::new("Knight", Faction::Ally, 20, 4).with_combat(9, 1),
                Position::new(2, 0),
            )
            .unwrap();

        let outcome = StatCombat::new().resolve(&level, bow, Position::new(2, 0));
        assert_eq!(outcome.attacker_health, 15);
        assert_eq!(outcome.defender_health, 15);
    }
}
