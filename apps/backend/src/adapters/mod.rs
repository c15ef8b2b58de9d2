pub mod matches_sea;
