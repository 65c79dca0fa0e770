//! Static, read-only knowledge about hosting providers whose "domain not
//! claimed" error pages betray a dangling DNS record.
//!
//! The table is compiled into the binary and shared by every worker without
//! synchronization. Entries are checked in slice order.

/// A hosting provider and the substring its unclaimed-domain page contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderFingerprint {
    /// Provider name, used only for reporting.
    pub provider: &'static str,
    /// Byte sequence searched for in the response body.
    pub fingerprint: &'static str,
}

/// Known takeover fingerprints, after the can-i-take-over-xyz list.
pub static FINGERPRINTS: &[ProviderFingerprint] = &[
    ProviderFingerprint { provider: "AWS/S3", fingerprint: "The specified bucket does not exist" },
    ProviderFingerprint { provider: "Bitbucket", fingerprint: "Repository not found" },
    ProviderFingerprint { provider: "Campaign Monitor", fingerprint: "'Trying to access your account?'" },
    ProviderFingerprint { provider: "Cargo Collective", fingerprint: "404 Not Found" },
    ProviderFingerprint { provider: "Cloudfront", fingerprint: "ViewerCertificateException" },
    ProviderFingerprint { provider: "Desk", fingerprint: "Please try again or try Desk.com free for 14 days." },
    ProviderFingerprint { provider: "Digital Ocean", fingerprint: "Domain uses DO name serves with no records in DO." },
    ProviderFingerprint { provider: "Fastly", fingerprint: "Fastly error: unknown domain:" },
    ProviderFingerprint { provider: "Feedpress", fingerprint: "The feed has not been found." },
    ProviderFingerprint { provider: "Ghost", fingerprint: "The thing you were looking for is no longer here, or never was" },
    ProviderFingerprint { provider: "Github", fingerprint: "There isn't a Github Pages site here." },
    ProviderFingerprint { provider: "HatenaBlog", fingerprint: "404 Blog is not found" },
    ProviderFingerprint { provider: "Help Juice", fingerprint: "We could not find what you're looking for." },
    ProviderFingerprint { provider: "Help Scout", fingerprint: "No settings were found for this company:" },
    ProviderFingerprint { provider: "Heroku", fingerprint: "No such app" },
    ProviderFingerprint { provider: "Intercom", fingerprint: "Uh oh. That page doesn't exist." },
    ProviderFingerprint { provider: "JetBrains", fingerprint: "is not a registered InCloud YouTrack" },
    ProviderFingerprint { provider: "Kinsta", fingerprint: "No Site For Domain" },
    ProviderFingerprint {
        provider: "LaunchRock",
        fingerprint: "It looks like you may have taken a wrong turn somewhere. Don't worry...it happens to all of us.",
    },
    ProviderFingerprint { provider: "Mashery", fingerprint: "Unrecognized domain" },
    ProviderFingerprint { provider: "Pantheon", fingerprint: "404 error unknown site!" },
    ProviderFingerprint { provider: "Readme.io", fingerprint: "Project doesnt exist... yet!" },
    ProviderFingerprint { provider: "Shopify", fingerprint: "Sorry, this shop is currently unavailable." },
    ProviderFingerprint {
        provider: "Statuspage",
        fingerprint: "Visiting the subdomain will redirect users to https://www.statuspage.io.",
    },
    ProviderFingerprint { provider: "Strikingly", fingerprint: "page not found" },
    ProviderFingerprint { provider: "Surge.sh", fingerprint: "project not found" },
    ProviderFingerprint {
        provider: "Tumblr",
        fingerprint: "Whatever you were looking for doesn't currently exist at this address",
    },
    ProviderFingerprint { provider: "Tilda", fingerprint: "Please renew your subscription" },
    ProviderFingerprint { provider: "Unbounce", fingerprint: "The requested URL was not found on this server." },
    ProviderFingerprint { provider: "UserVoice", fingerprint: "This UserVoice subdomain is currently available!" },
    ProviderFingerprint { provider: "Wordpress", fingerprint: "Do you want to register" },
    ProviderFingerprint { provider: "Zendesk", fingerprint: "Help Center Closed" },
];
