//! Unit tests for automation rules, action execution, and cascades.

mod support;
