use std::path::Path;

use image::DynamicImage;
use reqwest::blocking::Client;
use reqwest::Url;
use scraper::{Html, Selector};
use serde_json::Value;

use crate::config::Config;
use crate::download::{self, Progress};
use crate::error::{Error, Result};

/// Anchor carrying one catalog entry; the same markup is used for chants on
/// the index page and for albums on a chant page.
const LINK_SELECTOR: &str = "a.chants-title";

/// The album page embeds its playlist as a JSON argument to this player call.
const PLAYER_MARKER: &str = "vmAudioPlayer(";

#[derive(Debug, Clone)]
pub struct Chant {
    pub name: String,
    pub url: Url,
}

#[derive(Debug, Clone)]
pub struct Album {
    pub name: String,
    pub url: Url,
    /// Display name of the chant this album was listed under.
    pub chant: String,
}

#[derive(Debug, Clone)]
pub struct Song {
    pub title: String,
    pub artist: String,
    pub url: Url,
    /// 1-based position in the album's playlist.
    pub track: u32,
    /// Display name of the album this song belongs to.
    pub album: String,
}

#[derive(Debug, Clone)]
pub struct AlbumListing {
    pub songs: Vec<Song>,
    pub cover_url: Option<Url>,
}

/// What the session needs from the chant site. Implemented over HTTP in
/// production and faked in tests.
pub trait Catalog {
    fn chants(&self) -> Result<Vec<Chant>>;
    fn albums(&self, chant: &Chant) -> Result<Vec<Album>>;
    fn songs(&self, album: &Album) -> Result<AlbumListing>;
    fn fetch_media(&self, url: &Url, dest: &Path, progress: Progress) -> Result<u64>;
    fn fetch_cover(&self, url: &Url) -> Result<DynamicImage>;
}

/// Catalog backed by the live site, one blocking client for the whole
/// session.
pub struct HttpCatalog {
    client: Client,
    catalog_url: Url,
}

impl HttpCatalog {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::fetch(&config.catalog_url, e))?;
        Ok(HttpCatalog {
            client,
            catalog_url: config.catalog_url.clone(),
        })
    }

    fn get_page(&self, url: &Url) -> Result<String> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::fetch(url, e))?;
        response.text().map_err(|e| Error::fetch(url, e))
    }
}

impl Catalog for HttpCatalog {
    fn chants(&self) -> Result<Vec<Chant>> {
        let html = self.get_page(&self.catalog_url)?;
        parse_link_list(&html)?
            .into_iter()
            .map(|(name, href)| {
                Ok(Chant {
                    url: resolve(&self.catalog_url, &href)?,
                    name,
                })
            })
            .collect()
    }

    fn albums(&self, chant: &Chant) -> Result<Vec<Album>> {
        let html = self.get_page(&chant.url)?;
        parse_link_list(&html)?
            .into_iter()
            .map(|(name, href)| {
                Ok(Album {
                    url: resolve(&chant.url, &href)?,
                    name,
                    chant: chant.name.clone(),
                })
            })
            .collect()
    }

    fn songs(&self, album: &Album) -> Result<AlbumListing> {
        let html = self.get_page(&album.url)?;
        parse_album_listing(&html, &album.name, &album.url)
    }

    fn fetch_media(&self, url: &Url, dest: &Path, progress: Progress) -> Result<u64> {
        download::fetch_to_path(&self.client, url, dest, progress)
    }

    fn fetch_cover(&self, url: &Url) -> Result<DynamicImage> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::fetch(url, e))?;
        let bytes = response.bytes().map_err(|e| Error::fetch(url, e))?;
        image::load_from_memory(&bytes)
            .map_err(|e| Error::Parse(format!("cover at {} is not a decodable image: {}", url, e)))
    }
}

/// Extracts `(label, href)` pairs for every catalog anchor, in document
/// order. The label is the anchor's `title` attribute, falling back to its
/// text.
fn parse_link_list(html: &str) -> Result<Vec<(String, String)>> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(LINK_SELECTOR).unwrap();
    let mut links = Vec::new();
    for anchor in document.select(&selector) {
        let href = match anchor.value().attr("href") {
            Some(href) => href,
            None => continue,
        };
        let label = match anchor.value().attr("title") {
            Some(title) => title.trim().to_string(),
            None => anchor.text().collect::<String>().trim().to_string(),
        };
        if label.is_empty() {
            continue;
        }
        links.push((label, href.to_string()));
    }
    if links.is_empty() {
        return Err(Error::Parse("no catalog links on page".into()));
    }
    Ok(links)
}

/// Pulls the playlist out of the album page's embedded player call and
/// numbers the songs by their position.
fn parse_album_listing(html: &str, album: &str, base: &Url) -> Result<AlbumListing> {
    let document = Html::parse_document(html);
    let script_selector = Selector::parse("script").unwrap();

    let mut player = None;
    for script in document.select(&script_selector) {
        let text: String = script.text().collect();
        if let Some(at) = text.find(PLAYER_MARKER) {
            player = Some(text[at + PLAYER_MARKER.len()..].to_string());
            break;
        }
    }
    let player = player.ok_or_else(|| {
        Error::Parse(format!("no audio player block on the page for {:?}", album))
    })?;

    let data = first_json_value(&player)?;
    let entries = data
        .get("songs")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::Parse("player block has no songs array".into()))?;
    if entries.is_empty() {
        return Err(Error::Parse(format!("empty playlist for {:?}", album)));
    }

    let mut songs = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let title = entry
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Parse(format!("song {} has no name", index + 1)))?;
        let href = entry
            .get("url")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Parse(format!("song {:?} has no url", title)))?;
        let artist = entry
            .get("artist")
            .and_then(Value::as_str)
            .unwrap_or("Unknown");
        songs.push(Song {
            title: title.to_string(),
            artist: artist.to_string(),
            url: resolve(base, href)?,
            track: index as u32 + 1,
            album: album.to_string(),
        });
    }

    Ok(AlbumListing {
        cover_url: parse_cover_url(&document, base),
        songs,
    })
}

/// Decodes the JSON object at the start of `raw`, ignoring whatever follows
/// it, typically the `);` closing the player call.
fn first_json_value(raw: &str) -> Result<Value> {
    let mut stream = serde_json::Deserializer::from_str(raw).into_iter::<Value>();
    match stream.next() {
        Some(Ok(value)) => Ok(value),
        Some(Err(err)) => Err(Error::Parse(format!(
            "player block is not valid JSON: {}",
            err
        ))),
        None => Err(Error::Parse("player block is empty".into())),
    }
}

fn parse_cover_url(document: &Html, base: &Url) -> Option<Url> {
    let selector = Selector::parse(r#"meta[property="og:image"]"#).unwrap();
    let content = document.select(&selector).next()?.value().attr("content")?;
    base.join(content).ok()
}

fn resolve(base: &Url, href: &str) -> Result<Url> {
    base.join(href)
        .map_err(|e| Error::Parse(format!("unresolvable link {:?}: {}", href, e)))
}
