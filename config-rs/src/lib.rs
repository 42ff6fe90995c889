//! config-rs/lib.rs
//! Shared configuration utilities for consistent service configuration
//! Provides standardized helpers for env lookups and port/address management

use std::env;
use std::net::SocketAddr;

/// Get a string value from the environment with a fallback.
pub fn env_string(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Get an optional, non-empty string value from the environment.
pub fn env_opt(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Get a u64 value from the environment with a fallback.
pub fn env_u64(name: &str, default: u64) -> u64 {
    match env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(var = name, value = %raw, "invalid integer in environment, using default {default}");
            default
        }),
        Err(_) => default,
    }
}

/// Get a usize value from the environment with a fallback.
pub fn env_usize(name: &str, default: usize) -> usize {
    match env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(var = name, value = %raw, "invalid integer in environment, using default {default}");
            default
        }),
        Err(_) => default,
    }
}

/// Get a boolean flag from the environment. Accepts `true`/`1`/`yes`
/// (case-insensitive) as true and `false`/`0`/`no` as false.
pub fn env_flag(name: &str, default: bool) -> bool {
    match env::var(name) {
        Ok(raw) => match raw.to_lowercase().as_str() {
            "true" | "1" | "yes" => true,
            "false" | "0" | "no" => false,
            _ => {
                tracing::warn!(var = name, value = %raw, "invalid flag in environment, using default {default}");
                default
            }
        },
        Err(_) => default,
    }
}

/// Get a comma-separated list from the environment. Entries are trimmed;
/// empty entries are dropped.
pub fn env_list(name: &str) -> Vec<String> {
    match env::var(name) {
        Ok(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect(),
        Err(_) => Vec::new(),
    }
}

/// Get service port from environment variables with proper fallback.
///
/// Reads `{SERVICE_NAME}_SERVICE_PORT`, e.g. `AGENT_GATEWAY_SERVICE_PORT`.
pub fn get_service_port(service_name: &str, default_port: u16) -> u16 {
    let var_name = format!("{}_SERVICE_PORT", service_name.to_uppercase());
    env::var(&var_name)
        .unwrap_or_else(|_| default_port.to_string())
        .parse::<u16>()
        .unwrap_or_else(|_| {
            tracing::warn!("invalid port in {}, using default {}", var_name, default_port);
            default_port
        })
}

/// Create a SocketAddr for binding a service.
///
/// `{SERVICE_NAME}_SERVICE_ADDR` overrides the full address; otherwise the
/// service binds `0.0.0.0` on the configured port.
pub fn get_bind_address(service_name: &str, default_port: u16) -> SocketAddr {
    let var_name = format!("{}_SERVICE_ADDR", service_name.to_uppercase());

    if let Ok(addr_str) = env::var(&var_name) {
        if let Ok(addr) = addr_str.parse::<SocketAddr>() {
            return addr;
        }
        tracing::warn!("invalid address format in {}, using default", var_name);
    }

    let port = get_service_port(service_name, default_port);
    SocketAddr::from(([0, 0, 0, 0], port))
}

/// Get client connection address for reaching a service.
pub fn get_client_address(service_name: &str, default_port: u16, host: Option<&str>) -> String {
    let addr_var_name = format!("{}_SERVICE_ADDR", service_name.to_uppercase());

    if let Ok(addr) = env::var(&addr_var_name) {
        return addr;
    }

    let port = get_service_port(service_name, default_port);
    let host = host.unwrap_or("localhost");
    format!("http://{}:{}", host, port)
}
