pub mod arp;
pub mod icmp;
pub mod names;
