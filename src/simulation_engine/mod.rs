pub mod admission;
pub mod intersections;
pub mod network;
pub mod simulation;
pub mod streets;
pub mod vehicles;
