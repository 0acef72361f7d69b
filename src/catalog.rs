//! Static catalog of the security tools NEXUS knows how to simulate
//!
//! The catalog is read-only reference data. It is compiled into the binary,
//! never mutated, and lookups for unknown identifiers return `None` so
//! callers can fall back to generic behavior.

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed set of tool categories, in presentation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolCategory {
    /// Scanners, packet tools and sniffers
    Network,
    /// Web server and application testing
    Web,
    /// Login crackers and wordlist tooling
    Password,
    /// Exploit frameworks and payload generators
    Exploitation,
    /// WiFi auditing
    Wireless,
    /// OSINT and reconnaissance
    Recon,
}

impl ToolCategory {
    /// All categories in presentation order
    pub const ALL: [ToolCategory; 6] = [
        ToolCategory::Network,
        ToolCategory::Web,
        ToolCategory::Password,
        ToolCategory::Exploitation,
        ToolCategory::Wireless,
        ToolCategory::Recon,
    ];

    /// Wire name of the category
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Web => "web",
            Self::Password => "password",
            Self::Exploitation => "exploitation",
            Self::Wireless => "wireless",
            Self::Recon => "recon",
        }
    }
}

impl fmt::Display for ToolCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToolCatalogEntry {
    /// Identifier used in execution requests (e.g. `nmap`)
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// One-line description
    pub description: &'static str,
    /// Category the tool belongs to
    pub category: ToolCategory,
}

const fn entry(
    id: &'static str,
    name: &'static str,
    description: &'static str,
    category: ToolCategory,
) -> ToolCatalogEntry {
    ToolCatalogEntry {
        id,
        name,
        description,
        category,
    }
}

use ToolCategory::{Exploitation, Network, Password, Recon, Web, Wireless};

/// Catalog contents, grouped by category in [`ToolCategory::ALL`] order
static ENTRIES: [ToolCatalogEntry; 30] = [
    entry("nmap", "Nmap", "Network exploration and security auditing", Network),
    entry("netcat", "Netcat", "TCP/UDP connections and network debugging", Network),
    entry("masscan", "Masscan", "Fast port scanner", Network),
    entry("hping3", "Hping3", "Network packet generator and analyzer", Network),
    entry("arp-scan", "ARP-scan", "ARP scanning and fingerprinting", Network),
    entry("tcpdump", "TCPdump", "Network packet analyzer", Network),
    entry("nikto", "Nikto", "Web server scanner", Web),
    entry("dirb", "Dirb", "Web content scanner/directory brute forcer", Web),
    entry("sqlmap", "SQLmap", "Automatic SQL injection tool", Web),
    entry("gobuster", "Gobuster", "Directory/file & DNS busting tool", Web),
    entry("wpscan", "WPScan", "WordPress vulnerability scanner", Web),
    entry("burpsuite", "Burp Suite", "Web application security testing", Web),
    entry("hydra", "Hydra", "Fast network logon cracker", Password),
    entry("john", "John the Ripper", "Password cracker", Password),
    entry("hashcat", "Hashcat", "Advanced password recovery", Password),
    entry("medusa", "Medusa", "Parallel password cracker", Password),
    entry("cewl", "CeWL", "Custom word list generator", Password),
    entry("metasploit", "Metasploit", "Penetration testing framework", Exploitation),
    entry("searchsploit", "SearchSploit", "Exploit database search", Exploitation),
    entry("msfvenom", "MSFvenom", "Payload generator", Exploitation),
    entry("beef", "BeEF", "Browser exploitation framework", Exploitation),
    entry("aircrack-ng", "Aircrack-ng", "WiFi security auditing", Wireless),
    entry("reaver", "Reaver", "WPS brute force attack", Wireless),
    entry("wifite", "Wifite", "Automated wireless auditor", Wireless),
    entry("kismet", "Kismet", "Wireless network detector", Wireless),
    entry("whois", "Whois", "Domain lookup", Recon),
    entry("theHarvester", "theHarvester", "OSINT gathering", Recon),
    entry("maltego", "Maltego", "OSINT and forensics", Recon),
    entry("recon-ng", "Recon-ng", "Web reconnaissance framework", Recon),
    entry("shodan", "Shodan", "Internet-connected device search", Recon),
];

/// Read-only view over the built-in tool catalog
///
/// The type is `Copy` and carries no state of its own, so it can be handed
/// to every component that needs it.
///
/// # Examples
///
/// ```
/// use nexus::catalog::{ToolCatalog, ToolCategory};
///
/// let catalog = ToolCatalog::builtin();
/// let nmap = catalog.get("nmap").unwrap();
/// assert_eq!(nmap.category, ToolCategory::Network);
/// assert!(catalog.get("not-a-tool").is_none());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ToolCatalog {
    entries: &'static [ToolCatalogEntry],
}

impl ToolCatalog {
    /// Returns the catalog compiled into the binary
    pub fn builtin() -> Self {
        Self { entries: &ENTRIES }
    }

    /// All categories in presentation order
    pub fn categories(&self) -> &'static [ToolCategory] {
        &ToolCategory::ALL
    }

    /// All entries, flattened, in category order
    pub fn entries(&self) -> &'static [ToolCatalogEntry] {
        self.entries
    }

    /// Entries of a single category, in catalog order
    pub fn in_category(
        &self,
        category: ToolCategory,
    ) -> impl Iterator<Item = &'static ToolCatalogEntry> {
        self.entries.iter().filter(move |e| e.category == category)
    }

    /// Looks up an entry by identifier
    pub fn get(&self, id: &str) -> Option<&'static ToolCatalogEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Number of catalogued tools
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serializable `{category: [entries]}` view that keeps category order
    pub fn by_category(&self) -> CatalogByCategory {
        CatalogByCategory { catalog: *self }
    }
}

/// Grouped catalog view, serialized as an ordered JSON object
#[derive(Debug, Clone, Copy)]
pub struct CatalogByCategory {
    catalog: ToolCatalog,
}

impl Serialize for CatalogByCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let categories = self.catalog.categories();
        let mut map = serializer.serialize_map(Some(categories.len()))?;
        for category in categories {
            let entries: Vec<&ToolCatalogEntry> = self.catalog.in_category(*category).collect();
            map.serialize_entry(category.as_str(), &entries)?;
        }
        map.end()
    }
}
