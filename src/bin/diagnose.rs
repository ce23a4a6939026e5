//! Diagnostic tool - Check environment setup
//!
//! Run with: cargo run --bin diagnose
//!
//! Never touches the chain and never prints the private key.

use std::env;

/// Keeps the head and tail of a long url so api keys in the middle stay hidden
fn shorten(url: &str) -> String {
    let chars: Vec<char> = url.chars().collect();
    if chars.len() <= 50 {
        return url.to_string();
    }
    let head: String = chars[..30].iter().collect();
    let tail: String = chars[chars.len() - 15..].iter().collect();
    format!("{}...{}", head, tail)
}

fn main() {
    println!("🔍 SHIMMER SWAP DIAGNOSTIC CHECK\n");

    // Load .env
    let dotenv = dotenvy::dotenv();

    println!("═══════════════════════════════════════════════════");
    println!("                  ENVIRONMENT                       ");
    println!("═══════════════════════════════════════════════════\n");

    match &dotenv {
        Ok(path) => println!("  .env file: {}", path.display()),
        Err(_) => println!("  .env file: not found (using process environment)"),
    }
    println!();

    // Node endpoint
    let node = env::var("SHIMMEREVM_NODE_URL").ok().filter(|v| !v.trim().is_empty());
    match &node {
        Some(url) => {
            let display = shorten(url);
            let scheme_ok = url.starts_with("http://") || url.starts_with("https://");
            println!("  SHIMMEREVM_NODE_URL:        ✅ {}", display);
            if !scheme_ok {
                println!("    └─ ⚠️  expected an http(s) url");
            }
        }
        None => println!("  SHIMMEREVM_NODE_URL:        ❌ Not set"),
    }

    // Account
    let account = env::var("SHIMMEREVM_ACCOUNT_ADDRESS")
        .ok()
        .filter(|v| !v.trim().is_empty());
    match &account {
        Some(address) => {
            let trimmed = address.trim();
            let looks_valid = trimmed.len() == 42
                && trimmed.starts_with("0x")
                && hex::decode(&trimmed[2..]).is_ok();
            println!(
                "  SHIMMEREVM_ACCOUNT_ADDRESS: {} {}",
                if looks_valid { "✅" } else { "⚠️ " },
                trimmed
            );
            if !looks_valid {
                println!("    └─ not a 20-byte hex address");
            }
        }
        None => println!("  SHIMMEREVM_ACCOUNT_ADDRESS: ❌ Not set"),
    }

    // Private key: presence and shape only
    let key = env::var("SHIMMEREVM_PRIVATE_KEY").ok().filter(|v| !v.trim().is_empty());
    match &key {
        Some(key) => {
            let raw = key.trim().trim_start_matches("0x");
            let looks_valid = raw.len() == 64 && hex::decode(raw).is_ok();
            println!(
                "  SHIMMEREVM_PRIVATE_KEY:     {} Set{}",
                if looks_valid { "✅" } else { "⚠️ " },
                if looks_valid { "" } else { " (expected 32 hex bytes)" }
            );
        }
        None => println!("  SHIMMEREVM_PRIVATE_KEY:     ❌ Not set"),
    }

    let log = env::var("RUST_LOG").unwrap_or_else(|_| "shimmer_swap=info (default)".to_string());
    println!("  RUST_LOG:                   {}", log);

    println!("\n═══════════════════════════════════════════════════");
    println!("                     STATUS                         ");
    println!("═══════════════════════════════════════════════════\n");

    let can_quote = node.is_some();
    let can_send = can_quote && account.is_some() && key.is_some();

    println!(
        "  quote:          {}",
        if can_quote { "✅ Ready" } else { "❌ Needs SHIMMEREVM_NODE_URL" }
    );
    println!(
        "  swap / harvest: {}",
        if can_send {
            "✅ Ready (account and key are matched at startup)"
        } else {
            "❌ Needs node url, account address and private key"
        }
    );

    if can_send {
        println!("\n  ⚠️  swap and harvest send real transactions on chain 148.");
    }

    println!("\n✅ Diagnostic complete!\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_url_unchanged() {
        assert_eq!(shorten("https://json-rpc.evm.shimmer.network"), "https://json-rpc.evm.shimmer.network");
    }

    #[test]
    fn test_shorten_multibyte_url() {
        // 'é' is two bytes; byte offsets 30 and len-15 both land inside one
        let url = format!("https://{}/rpc/{}", "é".repeat(30), "ü".repeat(20));
        let display = shorten(&url);

        assert!(display.starts_with("https://éé"));
        assert!(display.ends_with(&"ü".repeat(15)));
        assert_eq!(display.chars().count(), 30 + 3 + 15);
    }
}
