use std::io::{BufRead, Write};
use std::path::PathBuf;

use image::DynamicImage;
use log::{error, info, warn};

use crate::catalog::{AlbumListing, Catalog, Song};
use crate::error::Result;
use crate::paths;
use crate::prompt::{Choice, Prompter};
use crate::tag::{self, TrackTags};

/// Receives download lifecycle events, keeping the renderer out of the
/// session logic. Production hands in a progress bar; tests record calls.
pub trait DownloadObserver {
    fn begin(&mut self, song: &Song);
    fn progress(&mut self, done: u64, total: Option<u64>);
    fn end(&mut self);
}

/// What happened over one session, reported to the user at the end.
#[derive(Debug, Default)]
pub struct Summary {
    pub succeeded: u32,
    pub failed: Vec<String>,
}

pub struct Session<C, R, W, O> {
    catalog: C,
    prompter: Prompter<R, W>,
    observer: O,
    output_root: PathBuf,
}

impl<C, R, W, O> Session<C, R, W, O>
where
    C: Catalog,
    R: BufRead,
    W: Write,
    O: DownloadObserver,
{
    pub fn new(catalog: C, prompter: Prompter<R, W>, observer: O, output_root: PathBuf) -> Self {
        Session {
            catalog,
            prompter,
            observer,
            output_root,
        }
    }

    /// Walks the user through chant, album and song selection, then downloads
    /// and tags sequentially in track order. Quitting at any menu ends the
    /// session normally; catalog failures before the download loop propagate
    /// to the caller.
    pub fn run(&mut self) -> Result<Summary> {
        let chants = self.catalog.chants()?;
        let names: Vec<String> = chants.iter().map(|c| c.name.clone()).collect();
        let chant = match self.prompter.choose("Chants:", &names)? {
            Choice::Selected(n) => &chants[n - 1],
            Choice::Quit => return Ok(Summary::default()),
        };

        let albums = self.catalog.albums(chant)?;
        let names: Vec<String> = albums.iter().map(|a| a.name.clone()).collect();
        let heading = format!("Albums in {}:", chant.name);
        let album = match self.prompter.choose(&heading, &names)? {
            Choice::Selected(n) => &albums[n - 1],
            Choice::Quit => return Ok(Summary::default()),
        };

        let listing = self.catalog.songs(album)?;
        let cover = self.fetch_cover(&listing);

        let songs: Vec<&Song> = if self.prompter.confirm("Download the entire album?")? {
            listing.songs.iter().collect()
        } else {
            let titles: Vec<String> = listing.songs.iter().map(|s| s.title.clone()).collect();
            let heading = format!("Songs in {}:", album.name);
            match self.prompter.choose(&heading, &titles)? {
                Choice::Selected(n) => vec![&listing.songs[n - 1]],
                Choice::Quit => return Ok(Summary::default()),
            }
        };

        let mut summary = Summary::default();
        for song in songs {
            match self.process(song, cover.as_ref()) {
                Ok(()) => summary.succeeded += 1,
                Err(err) => {
                    error!("{}: {}", song.title, err);
                    summary.failed.push(song.title.clone());
                }
            }
        }
        Ok(summary)
    }

    /// Downloads one song and tags it. A tag failure counts the song as
    /// failed but the downloaded audio stays on disk.
    fn process(&mut self, song: &Song, cover: Option<&DynamicImage>) -> Result<()> {
        let dest = paths::song_path(&self.output_root, &song.album, &song.title);
        info!("downloading {} -> {}", song.title, dest.display());

        let catalog = &self.catalog;
        let observer = &mut self.observer;
        observer.begin(song);
        let downloaded = {
            let mut on_chunk = |done: u64, total: Option<u64>| observer.progress(done, total);
            catalog.fetch_media(&song.url, &dest, &mut on_chunk)
        };
        observer.end();
        downloaded?;

        tag::write_tags(
            &dest,
            &TrackTags {
                title: &song.title,
                album: &song.album,
                artist: &song.artist,
                track: song.track,
                cover,
            },
        )?;
        Ok(())
    }

    fn fetch_cover(&self, listing: &AlbumListing) -> Option<DynamicImage> {
        let url = listing.cover_url.as_ref()?;
        match self.catalog.fetch_cover(url) {
            Ok(image) => Some(image),
            Err(err) => {
                warn!("skipping cover art: {}", err);
                None
            }
        }
    }
}
