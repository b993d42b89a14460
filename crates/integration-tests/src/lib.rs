//! End-to-end tests for the vibelog-tts service live under `tests/`
