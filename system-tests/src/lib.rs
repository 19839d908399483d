// system-tests/src/lib.rs
// ============================================================================
// Module: Booking Probe System Tests Library
// Description: Shared configuration for system test scenarios.
// Purpose: Provide common settings for booking-probe system-test binaries.
// Dependencies: std
// ============================================================================

//! ## Overview
//! This crate hosts shared configuration used by the booking-probe
//! system-test binaries in `system-tests/tests`.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
