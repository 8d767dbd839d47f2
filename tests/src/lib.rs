//! Cross-crate tests for the discovery engine. Nothing here touches the real
//! network unless marked `#[ignore]`.

#[cfg(test)]
mod support;

mod vendors;
