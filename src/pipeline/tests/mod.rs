//! Unit tests for the pipeline bounded context.
