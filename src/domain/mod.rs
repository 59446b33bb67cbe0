// Domain layer - Core types shared by every stage

pub mod model;
