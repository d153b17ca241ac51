// PHI audit — static analysis tests that scan all Rust source files for
// tracing:: calls containing PHI field patterns. Prevents note content from
// leaking back into logs via regression.
