use std::io::Cursor;
use std::path::Path;

use id3::TagLike;
use image::DynamicImage;

use crate::error::{Error, Result};

const COMMENT_TEXT: &str = "Downloaded with chantdl";

/// The fields written into a downloaded file, borrowed from the song and
/// album they came from.
pub struct TrackTags<'a> {
    pub title: &'a str,
    pub album: &'a str,
    pub artist: &'a str,
    pub track: u32,
    pub cover: Option<&'a DynamicImage>,
}

/// Writes ID3v2.4 tags into the file at `path`, creating the tag block when
/// the file has none. On failure the audio bytes are left untouched.
pub fn write_tags(path: &Path, tags: &TrackTags) -> Result<()> {
    let mut tag = match id3::Tag::read_from_path(path) {
        Ok(tag) => tag,
        Err(err) if matches!(err.kind, id3::ErrorKind::NoTag) => id3::Tag::new(),
        Err(err) => return Err(Error::Tag(err)),
    };

    tag.set_title(tags.title);
    tag.set_album(tags.album);
    tag.set_artist(tags.artist);
    tag.set_track(tags.track);
    tag.add_frame(id3::frame::Comment {
        lang: "eng".to_string(),
        description: "tool".to_string(),
        text: COMMENT_TEXT.to_string(),
    });
    if let Some(cover) = tags.cover {
        match encode_jpeg(cover) {
            Ok(data) => {
                tag.add_frame(id3::frame::Picture {
                    mime_type: String::from("image/jpeg"),
                    picture_type: id3::frame::PictureType::CoverFront,
                    description: String::new(),
                    data,
                });
            }
            Err(err) => log::warn!("could not encode cover art, tagging without it: {}", err),
        }
    }

    tag.write_to_path(path, id3::Version::Id3v24)?;
    Ok(())
}

fn encode_jpeg(cover: &DynamicImage) -> image::ImageResult<Vec<u8>> {
    let mut bytes = Cursor::new(Vec::new());
    cover.write_to(&mut bytes, image::ImageOutputFormat::Jpeg(90))?;
    Ok(bytes.into_inner())
}
