pub mod camera;
pub mod connections;
pub mod core;
pub mod flow;
pub mod formation;
pub mod loading;
pub mod mesh;
pub mod nodes;
pub mod particles;
pub mod render;
pub mod systems;
