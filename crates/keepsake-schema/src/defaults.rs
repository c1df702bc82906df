//! The canonical default document.
//!
//! Every section carries sample content so a fresh install is usable with no
//! configuration. Each call builds a new, independently owned [`Document`].

use keepsake_types::{
    BucketItem, BucketList, Document, Event, GalleryEntry, Homepage, LoveLanguage, LoveLanguages,
    LoveReasons, MemoryEntry, Note, Playlist, Promises, Song, Surprise, VideoMontage,
};

/// Directory the bundled placeholder images are served from.
pub const ASSET_DIR: &str = "assets/images";

fn asset(file: &str) -> String {
    format!("{ASSET_DIR}/{file}")
}

/// Build the default document.
pub fn defaults() -> Document {
    Document {
        homepage: Homepage {
            main_image: asset("nature.jpg"),
            intro_message: "Welcome to the world I created just for you to celebrate the \
                wonderful person you are. It is a treasure to look back at our journey, our \
                joys, and all the moments that make our life together so special. Every day \
                with you is a new adventure, and I cherish every moment we share together. I \
                love you more than words can say."
                .into(),
            relationship_tag: "My Soulmate".into(),
            relationship_start: "2020-01-01T00:00:00.000Z".into(),
        },
        events: vec![
            event(
                "2023-09-10",
                "Said \"I Love You\"",
                "The moment I finally told you how I really felt. Best decision ever.",
                false,
                "milestone",
            ),
            event(
                "2024-07-04",
                "Beach Weekend",
                "Watching the sunset together by the ocean. Pure magic.",
                true,
                "trip",
            ),
            event(
                "2024-10-30",
                "Cozy Fall Evening",
                "Hot cocoa, blankets, and your favorite movie. Perfect winter night.",
                true,
                "memory",
            ),
        ],
        notes: vec![
            note("2025-12-15", "Plan surprise dinner for anniversary"),
            note("2026-02-14", "Book spa weekend for Valentine's Day"),
            note("2026-06-20", "Research summer vacation destinations together"),
        ],
        photo_gallery: default_gallery(),
        promises: Promises {
            intro: "I'll always be there for you, through every season of life. Here are my \
                promises to you..."
                .into(),
            promises: strings(&[
                "I promise to always make you laugh, even on the hardest days",
                "I promise to support your dreams and celebrate your victories",
                "I promise to always choose you, every single day",
            ]),
        },
        love_reasons: LoveReasons {
            intro: "I could list hundreds of reasons why I love you, but here are just a few \
                that make my heart full..."
                .into(),
            reasons: strings(&[
                "The way you care so deeply about everyone around you",
                "Your adventurous spirit that makes life exciting",
                "How comfortable I feel being completely myself with you",
            ]),
        },
        love_languages: LoveLanguages {
            intro: "They say there are many ways to say 'I love you', and this is how I speak \
                my love to you."
                .into(),
            languages: vec![
                LoveLanguage {
                    name: "Words of Affirmation".into(),
                    icon: "fas fa-comments".into(),
                    description: "Telling you how much you mean to me, complimenting you, and \
                        expressing my love through heartfelt words and messages."
                        .into(),
                },
                LoveLanguage {
                    name: "Physical Touch".into(),
                    icon: "fas fa-hand-holding-heart".into(),
                    description: "Holding hands, warm hugs, and gentle kisses. Physical \
                        connection that reminds us we're always there for each other."
                        .into(),
                },
                LoveLanguage {
                    name: "Gift Giving".into(),
                    icon: "fas fa-gift".into(),
                    description: "Thoughtful surprises that show I'm always thinking of you - \
                        from your favorite snack to something that reminded me of us."
                        .into(),
                },
            ],
        },
        bucket_list: BucketList {
            intro: "The future is bright and full of possibilities. Here's what I'm dreaming \
                of experiencing with you."
                .into(),
            items: vec![
                bucket_item(
                    "Go Skydiving",
                    "Experience the thrill of freefalling together and conquer our fears.",
                    "2026-08-15",
                    "fas fa-parachute-box",
                    false,
                ),
                bucket_item(
                    "Watch Sunrise from a Mountain",
                    "Hike up early and witness the world wake up from a beautiful peak.",
                    "2024-09-20",
                    "fas fa-mountain-sun",
                    true,
                ),
                bucket_item(
                    "Road Trip Across the Country",
                    "Take a spontaneous adventure with no strict plans, just us and the open road.",
                    "2027-06-01",
                    "fas fa-road",
                    false,
                ),
            ],
        },
        memory_book: vec![
            memory(
                "2023-05-14",
                "Getting caught in the rain and laughing until our sides hurt. Pure joy.",
                "Him",
            ),
            memory(
                "2024-03-17",
                "Building that bookshelf together and only arguing once. We make a great team!",
                "Him",
            ),
            memory(
                "2024-08-25",
                "Your face when I told you I love your weird laugh - priceless and adorable.",
                "Her",
            ),
        ],
        playlist: Playlist {
            intro: "Some songs that make me think of you and some are the soundtracks of our \
                love story..."
                .into(),
            songs: vec![
                Song {
                    title: String::new(),
                    artist: None,
                    embed_id: "https://www.youtube.com/watch?v=EmsNH47y7Jo".into(),
                    note: "Reminds me of our first date".into(),
                },
                Song {
                    title: "You are my everything".into(),
                    artist: None,
                    embed_id: "https://www.youtube.com/watch?v=_NhwOcq_2Bw".into(),
                    note: "Our song - reminds me of our first dance together".into(),
                },
                Song {
                    title: "Make You Feel My Love".into(),
                    artist: Some("Adele".into()),
                    embed_id: "https://www.youtube.com/watch?v=zeVWTY31Vn8".into(),
                    note: "I'd do anything to make you happy".into(),
                },
            ],
        },
        video_montage: VideoMontage {
            intro: "A special clip of our favorite moments together, for the person who means \
                everything to me..."
                .into(),
            file_id: "https://www.youtube.com/watch?v=xdHx1YEsWwk".into(),
        },
        surprise: Surprise {
            title: "You're My Everything!".into(),
            message: "Every day with you is a gift. Thank you for being you, for loving me, and \
                for making life so beautiful. I can't wait to create a million more memories \
                with you. \u{1F495}"
                .into(),
            image: asset("giftcard.png"),
            wheel_items: strings(&[
                "Fancy Dinner",
                "Movie Marathon",
                "Couples Massage",
                "Beach Picnic",
                "Game Night",
                "Cooking Together",
                "Sunrise Hike",
                "Wine Tasting",
            ]),
        },
        display_name: None,
        extra: Default::default(),
    }
}

/// Placeholder gallery seeded into the photo partition on first run.
pub fn default_gallery() -> Vec<GalleryEntry> {
    vec![
        GalleryEntry::new(asset("city.jpg"), Some("Love Proposal...")),
        GalleryEntry::new(asset("nature.jpg"), None),
        GalleryEntry::new(asset("picnic.jpeg"), Some("Sunday Evening...")),
        GalleryEntry::new(asset("ai.png"), None),
        GalleryEntry::new(asset("ghibli.jpg"), None),
        GalleryEntry::new(asset("indian.png"), None),
    ]
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn event(date: &str, title: &str, description: &str, show_year: bool, kind: &str) -> Event {
    Event {
        date: date.into(),
        title: title.into(),
        description: description.into(),
        show_year,
        kind: kind.into(),
    }
}

fn note(date: &str, text: &str) -> Note {
    Note {
        date: date.into(),
        text: text.into(),
    }
}

fn bucket_item(
    item: &str,
    description: &str,
    target_date: &str,
    icon: &str,
    completed: bool,
) -> BucketItem {
    BucketItem {
        item: item.into(),
        description: description.into(),
        target_date: target_date.into(),
        icon: icon.into(),
        completed,
    }
}

fn memory(date: &str, message: &str, author: &str) -> MemoryEntry {
    MemoryEntry {
        date: date.into(),
        message: message.into(),
        author: author.into(),
    }
}
