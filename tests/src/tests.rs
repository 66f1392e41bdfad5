#![cfg(test)]

mod helpers;

mod breakpoints;
mod decode;
mod display;
mod io;
mod listings;
mod progs;
