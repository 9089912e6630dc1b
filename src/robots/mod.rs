//! Exclusion-policy handling
//!
//! Parses the minimal subset of robots.txt that tumblr actually serves:
//! `Sitemap: ` and `Disallow: ` lines, in file order, with no user-agent
//! scoping and no wildcard expansion. This is deliberately not a
//! general-purpose robots.txt parser.

mod parser;

pub use parser::RobotsInfo;
