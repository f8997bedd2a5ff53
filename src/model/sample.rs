//! Bundled sample catalog shown when the backend is unreachable or empty.

use super::content::{Artist, DEFAULT_ARTIST_IMAGE, License, Playlist, Track};
use super::playback::LyricLine;

const COVERS: [&str; 6] = [
    "https://images.unsplash.com/photo-1614613535308-eb5fbd3d2c17?w=300&h=300&fit=crop",
    "https://images.unsplash.com/photo-1621360841012-3f868c6883cd?w=300&h=300&fit=crop",
    "https://images.unsplash.com/photo-1493225255756-d9584f8606e9?w=300&h=300&fit=crop",
    "https://images.unsplash.com/photo-1619983081563-430f63602796?w=300&h=300&fit=crop",
    "https://images.unsplash.com/photo-1470225620780-dba8ba36b745?w=300&h=300&fit=crop",
    "https://images.unsplash.com/photo-1511379938547-c1f69419868d?w=300&h=300&fit=crop",
];

// (title, artist, album, duration, genre, year, rating)
const SONGS: [(&str, &str, &str, u32, &str, i32, u8); 30] = [
    ("HYPERREALITY", "GRIMES", "ART ANGELS", 243, "GLITCH", 2015, 5),
    ("DIGITAL LOVE", "DAFT PUNK", "DISCOVERY", 337, "TECHNO", 2001, 5),
    ("NEON GUTS", "LIL UZI VERT", "LUV IS RAGE 2", 216, "VAPOR", 2017, 4),
    ("CHROMATICA", "LADY GAGA", "CHROMATICA", 200, "CYBER", 2020, 4),
    ("FUTURE NOSTALGIA", "DUA LIPA", "FUTURE NOSTALGIA", 203, "GLITCH", 2020, 5),
    ("STORIES FROM EMONA I", "MAYA FILIPIČ", "BETWEEN TWO WORLDS", 209, "AMBIENT", 2010, 3),
    ("DANIEL", "NATASHA BELLER", "FAIRYTALE", 244, "ACID", 2018, 4),
    ("GHOST IN THE SHELL", "KENJI KAWAI", "OST", 310, "CYBER", 1995, 5),
    ("ACID RAIN", "LORN", "THE MAZE TO NOWHERE", 180, "GLITCH", 2015, 5),
    ("XENOMORPH", "GESTAFFELSTEIN", "ALEPH", 250, "TECHNO", 2013, 4),
    ("CYBERPUNK DREAMS", "SYNTHWAVE COLLECTIVE", "NEON NIGHTS", 267, "TECHNO", 2019, 4),
    ("ELECTRIC SHEEP", "BLADE RUNNER", "ANDROID DREAMS", 189, "AMBIENT", 2017, 5),
    ("MATRIX RELOADED", "DIGITAL BEINGS", "VIRTUAL REALITY", 298, "GLITCH", 2021, 5),
    ("NEON TOKYO", "CYBER PUNK", "NIGHT CITY", 223, "VAPOR", 2018, 4),
    ("QUANTUM LEAP", "TIME TRAVELER", "PARADOX", 312, "TECHNO", 2020, 5),
    ("HOLOGRAPHIC LOVE", "VIRTUAL ROMANCE", "DIGITAL HEARTS", 256, "CYBER", 2019, 4),
    ("SYNTH WAVE SUNSET", "RETRO FUTURE", "80S REVIVAL", 234, "ACID", 2016, 4),
    ("BINARY SUNSET", "STAR WARS", "FORCE AWAKENS", 278, "AMBIENT", 2015, 5),
    ("PIXEL PERFECT", "8BIT WARRIORS", "CHIPTUNE MADNESS", 198, "GLITCH", 2014, 3),
    ("LASER GRID", "TRON LEGACY", "GRID WARS", 289, "TECHNO", 2010, 5),
    ("CHROME HEARTS", "METALLIC DREAMS", "STEEL EMOTIONS", 245, "VAPOR", 2022, 4),
    ("DATA STREAM", "NETWORK GHOST", "PROTOCOL 7", 267, "CYBER", 2021, 4),
    ("NEON PULSE", "CITY LIGHTS", "URBAN GLOW", 221, "ACID", 2019, 5),
    ("VIRTUAL VORTEX", "DIMENSION X", "PARALLEL UNIVERSE", 301, "GLITCH", 2020, 5),
    ("COSMIC RAY", "SPACE ODYSSEY", "STELLAR WINDS", 278, "AMBIENT", 2018, 4),
    ("TERMINAL VELOCITY", "SPEED DEMONS", "MAXIMUM OVERDRIVE", 234, "TECHNO", 2017, 4),
    ("DIGITAL RAIN", "MATRIX CODE", "GREEN CASCADE", 256, "GLITCH", 2016, 5),
    ("MIDNIGHT RUNNER", "BLADE RUNNER 2049", "NEO NOIR", 289, "VAPOR", 2022, 5),
    ("FRACTAL DREAMS", "MATHEMATICAL MINDS", "INFINITE PATTERNS", 312, "AMBIENT", 2021, 4),
    ("NEON SAMURAI", "TOKYO NIGHTS", "CYBER WARRIOR", 243, "CYBER", 2020, 5),
];

const ARTISTS: [&str; 25] = [
    "GRIMES", "DAFT PUNK", "LIL UZI VERT", "LADY GAGA", "DUA LIPA", "THE WEEKND",
    "TAME IMPALA", "KANYE WEST", "APHEX TWIN", "SOPHIE", "SYNTHWAVE COLLECTIVE",
    "BLADE RUNNER", "DIGITAL BEINGS", "CYBER PUNK", "TIME TRAVELER", "VIRTUAL ROMANCE",
    "RETRO FUTURE", "STAR WARS", "8BIT WARRIORS", "TRON LEGACY", "METALLIC DREAMS",
    "NETWORK GHOST", "CITY LIGHTS", "DIMENSION X", "SPACE ODYSSEY",
];

const PLAYLISTS: [&str; 4] = ["LIQUID_METAL_MIX", "NEURO_FUNK", "Y2K_REVIVAL", "DATA_MOSHR"];

const LYRICS: [(f64, &str); 16] = [
    (0.0, "[INITIALIZING_AUDIO_STREAM]"),
    (5.0, "SYSTEM_CHECK... OK"),
    (10.0, "LOADING_VIRTUAL_REALITY..."),
    (14.0, "WAITING_IN_THE_CAR"),
    (18.0, "WAITING_FOR_A_RIDE_IN_THE_DARK"),
    (25.0, "THE_NIGHT_CITY_GROWS"),
    (30.0, "LOOK_AND_SEE_HER_EYES_THEY_GLOW"),
    (38.0, "[DATA_CORRUPTION_DETECTED]"),
    (45.0, "DRIVING_DOWN_THE_STREET"),
    (52.0, "LOOKING_FOR_A_SOUND_THAT_IS_SWEET"),
    (60.0, "[SYNTH_SOLO_SEQUENCE_START]"),
    (70.0, "01001000 01001001"),
    (85.0, "THE_CITY_IS_MY_CHURCH"),
    (92.0, "IT_WRAPS_ME_IN_THE_BLINDING_TWILIGHT"),
    (100.0, "WAITING_FOR_THE_SIGNAL"),
    (110.0, "TO_UPLOAD_MY_CONSCIOUSNESS"),
];

pub fn sample_tracks() -> Vec<Track> {
    SONGS
        .iter()
        .enumerate()
        .map(|(i, (title, artist, album, duration, genre, year, rating))| {
            let n = i + 1;
            // Only the first five samples ship a streamable URL
            let url = if n <= 5 {
                format!("https://www.soundhelix.com/examples/mp3/SoundHelix-Song-{n}.mp3")
            } else {
                String::new()
            };
            Track {
                id: n.to_string(),
                title: title.to_string(),
                artist: artist.to_string(),
                artist_id: None,
                album: album.to_string(),
                album_id: None,
                cover_url: COVERS[i % COVERS.len()].to_string(),
                duration_secs: *duration,
                url,
                genre: genre.to_string(),
                year: *year,
                plays: 0,
                likes: 0,
                rating: *rating,
                track_number: None,
                lyrics: None,
                license: License::default(),
            }
        })
        .collect()
}

pub fn sample_artists() -> Vec<Artist> {
    ARTISTS
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let song_count = SONGS.iter().filter(|s| s.1 == *name).count();
            Artist {
                id: (i + 1).to_string(),
                name: name.to_string(),
                avatar_url: COVERS
                    .get(i % COVERS.len())
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| DEFAULT_ARTIST_IMAGE.to_string()),
                genres: Vec::new(),
                country: None,
                bio: None,
                website: None,
                social_links: Default::default(),
                albums: Vec::new(),
                album_count: 0,
                song_count,
                top_tracks: Vec::new(),
            }
        })
        .collect()
}

pub fn sample_playlists() -> Vec<Playlist> {
    PLAYLISTS
        .iter()
        .enumerate()
        .map(|(i, name)| Playlist::local(format!("sample-{}", i + 1), name.to_string()))
        .collect()
}

pub fn sample_lyrics() -> Vec<LyricLine> {
    LYRICS.iter().map(|(t, text)| LyricLine::new(*t, *text)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_catalog_is_not_empty_and_ids_are_unique() {
        let tracks = sample_tracks();
        assert_eq!(tracks.len(), 30);
        let mut ids: Vec<_> = tracks.iter().map(|t| t.id.clone()).collect();
        ids.dedup();
        assert_eq!(ids.len(), 30);
        assert!(!sample_artists().is_empty());
    }

    #[test]
    fn sample_lyrics_are_sorted() {
        let lyrics = sample_lyrics();
        assert!(lyrics.windows(2).all(|w| w[0].time < w[1].time));
    }
}
