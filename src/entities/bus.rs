use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Buses at or below this seat count are classified as minibuses.
pub const MINI_BUS_MAX_SEATS: i32 = 25;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bus")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub info: Option<String>,
    pub num_seats: i32,
}

impl Model {
    pub fn is_mini(&self) -> bool {
        self.num_seats <= MINI_BUS_MAX_SEATS
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::trip::Entity")]
    Trips,
}

impl Related<super::trip::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Trips.def()
    }
}

impl Related<super::facility::Entity> for Entity {
    fn to() -> RelationDef {
        super::bus_facility::Relation::Facility.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::bus_facility::Relation::Bus.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
