pub mod link;
mod sock;
