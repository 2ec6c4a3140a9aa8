//! End-to-end tests for the chat pipeline and HTTP surface, driven
//! against mock providers.

mod endpoints;
mod support;
