//! Map/Difficulty Scenario Associations
//!
//! Database-authored mapping from a concrete map and difficulty to the
//! scenario each team runs there.

use crate::map::Team;

/// Which scenario a map/difficulty combination runs, per team.
///
/// Zero scenario ids exist in storage as the wire representation of "no
/// scenario"; resolution goes through `scenario_for`, which only ever
/// answers present or absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScenarioAssociation {
    pub map_id: u32,
    pub difficulty: u8,
    pub alliance_scenario: u32,
    pub horde_scenario: u32,
}

impl ScenarioAssociation {
    /// Scenario id for the given team, if one is configured
    pub fn scenario_for(&self, team: Team) -> Option<u32> {
        let id = match team {
            Team::Alliance => self.alliance_scenario,
            Team::Horde => self.horde_scenario,
            Team::Neutral => 0,
        };
        (id != 0).then_some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_per_team() {
        let association = ScenarioAssociation {
            map_id: 1000,
            difficulty: 1,
            alliance_scenario: 7,
            horde_scenario: 8,
        };

        assert_eq!(association.scenario_for(Team::Alliance), Some(7));
        assert_eq!(association.scenario_for(Team::Horde), Some(8));
    }

    #[test]
    fn neutral_resolves_nothing() {
        let association = ScenarioAssociation {
            map_id: 1000,
            difficulty: 1,
            alliance_scenario: 7,
            horde_scenario: 8,
        };

        assert_eq!(association.scenario_for(Team::Neutral), None);
    }

    #[test]
    fn zero_id_is_absent() {
        let association = ScenarioAssociation {
            map_id: 1000,
            difficulty: 1,
            alliance_scenario: 0,
            horde_scenario: 0,
        };

        assert_eq!(association.scenario_for(Team::Alliance), None);
        assert_eq!(association.scenario_for(Team::Horde), None);
    }
}
