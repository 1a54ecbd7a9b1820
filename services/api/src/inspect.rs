use crate::infra::http_source;
use clap::Args;
use site_config::config::{AppConfig, CmsConfig};
use site_config::configuration::{
    ConfigurationCache, FetchError, LanguageConfig, MaintenanceStatus, SiteProfile, SystemClock,
};
use site_config::error::AppError;
use std::sync::Arc;
use url::Url;

#[derive(Args, Debug, Default)]
pub(crate) struct InspectArgs {
    /// CMS base URL (defaults to CMS_API_BASE_URL)
    #[arg(long)]
    pub(crate) base_url: Option<Url>,
    /// Print the unwrapped configuration document as JSON as well
    #[arg(long)]
    pub(crate) raw: bool,
    /// Accept-Language value used to pick the initial language
    #[arg(long)]
    pub(crate) browser_language: Option<String>,
}

pub(crate) async fn run_inspect(args: InspectArgs) -> Result<(), AppError> {
    let InspectArgs {
        base_url,
        raw,
        browser_language,
    } = args;

    let mut config = AppConfig::load()?;
    if let Some(base_url) = base_url {
        config.cms.base_url = base_url;
    }

    let cache = inspect_cache(&config.cms)?;
    let document = cache.fetch_configurations(true).await?;

    println!("Site configuration from {}", config.cms.base_url);
    if let Some(fetched_at) = cache.last_fetch_time() {
        println!("Fetched at {} ({} sections)", fetched_at.to_rfc3339(), document.len());
    }

    let profile = SiteProfile::from_document(&document);
    let language = LanguageConfig::resolve(&cache).await;
    let maintenance = MaintenanceStatus::resolve(&cache).await;

    render_site_report(
        &profile,
        &language,
        &maintenance,
        browser_language.as_deref(),
    );

    if raw {
        match serde_json::to_string_pretty(document.as_map()) {
            Ok(json) => println!("\nRaw document\n{}", json),
            Err(err) => println!("\nRaw document unavailable: {}", err),
        }
    }

    Ok(())
}

pub(crate) fn inspect_cache(cms: &CmsConfig) -> Result<ConfigurationCache, FetchError> {
    let source = http_source(cms)?;
    Ok(ConfigurationCache::with_clock(source, Arc::new(SystemClock), cms.cache_ttl))
}

pub(crate) fn render_site_report(
    profile: &SiteProfile,
    language: &LanguageConfig,
    maintenance: &MaintenanceStatus,
    browser_language: Option<&str>,
) {
    println!("\nGeneral");
    println!("- Name: {}", display(&profile.general.app_name));
    println!("- Description: {}", display(&profile.general.app_description));
    println!("- Apply now: {}", display(&profile.general.apply_now_link));

    println!("\nContact");
    println!("- Phone: {}", display(&profile.contact.contact_phone));
    println!("- Email: {}", display(&profile.contact.contact_email));
    println!("- WhatsApp: {}", display(&profile.contact.contact_whatsapp));
    println!("- Address: {}", display(&profile.contact.contact_address));
    if profile.contact.social_media.is_empty() {
        println!("- Social media: none");
    } else {
        println!("- Social media:");
        for item in &profile.contact.social_media {
            println!("    - {}: {}", item.platform, display(&item.url));
        }
    }

    println!("\nOJK");
    println!("- {}", profile.ojk.ojk_title);
    println!("- {}", profile.ojk.ojk_description);
    println!("- {} image(s)", profile.ojk.ojk_images.len());

    println!("\nLanguage");
    let available: Vec<&str> = language
        .available_languages()
        .into_iter()
        .map(|lang| lang.code())
        .collect();
    println!(
        "- Default {} | available [{}] | switcher {}",
        language.default_language.code(),
        available.join(", "),
        if language.can_switch_language() { "on" } else { "off" }
    );
    println!(
        "- Initial language for {}: {}",
        browser_language.unwrap_or("no browser hint"),
        language.initial_language(browser_language).code()
    );

    println!("\nJoin us");
    println!(
        "- Career email: {}",
        display(&profile.join_us.career_application_email)
    );

    if maintenance.enabled {
        println!("\nMaintenance: ON");
        println!("- Title: {}", display(&maintenance.title));
        println!("- Message: {}", display(&maintenance.message));
        println!("- Estimated: {}", display(&maintenance.estimated_time));
        println!("- Contact: {}", display(&maintenance.contact_email));
    } else {
        println!("\nMaintenance: off");
    }
}

fn display(value: &str) -> &str {
    if value.is_empty() {
        "(not set)"
    } else {
        value
    }
}
