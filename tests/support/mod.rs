#![allow(dead_code)]

pub mod config_home;
pub mod observer;
pub mod playback;
pub mod wav;
