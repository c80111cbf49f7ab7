// demos/anilist_rating.rs
use release_enricher::integrations::anilist::client::AniListClient;
use release_enricher::normalize_title;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let raw = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Sousou no Frieren - 05".to_string());
    let title = normalize_title(&raw);

    let client = AniListClient::new()?;
    match client.fetch_average_score(&title).await? {
        Some(score) => println!("{} - average score: {}%", title, score),
        None => println!("{} - no score on AniList", title),
    }
    Ok(())
}
