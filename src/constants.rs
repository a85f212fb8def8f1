pub mod badges {

    pub const PROFILE_PHOTO_UPLOADED: &str = "profile_photo_uploaded";

    pub const PROFILE_COMPLETE: &str = "profile_complete";

    /// (key, display name, description)
    pub const CATALOG: &[(&str, &str, &str)] = &[
        (
            PROFILE_PHOTO_UPLOADED,
            "Profile picture",
            "User uploaded a profile photo",
        ),
        (
            PROFILE_COMPLETE,
            "Complete Profile",
            "User completed all required profile information",
        ),
        (
            "watch_50_videos",
            "Watched 50 Videos",
            "User has watched 50 videos",
        ),
        (
            "share_10_videos",
            "Shared 10 Videos",
            "User has shared 10 videos",
        ),
        (
            "like_25_videos",
            "Liked 25 Videos",
            "User has liked 25 videos",
        ),
    ];
}

pub mod interests {

    /// Sector keys offered to every user.
    pub const CATALOG: &[&str] = &[
        "Gezondheidszorg en Welzijn",
        "Handel en Dienstverlening",
        "ICT",
        "Justitie, Veiligheid en Openbaar Bestuur",
        "Milieu en Agrarische Sector",
        "Media en Communicatie",
        "Onderwijs, Cultuur en Wetenschap",
        "Techniek, Productie en Bouw",
        "Toerisme, Recreatie en Horeca",
        "Transport en Logistiek",
        "Behoefte aan Investering",
        "Interesse om te Investeren",
    ];
}

pub mod uploads {

    /// Accepted profile photo content types and the extension stored for each.
    pub const PROFILE_PHOTO_TYPES: &[(&str, &str)] = &[
        ("image/jpeg", "jpg"),
        ("image/png", "png"),
        ("image/webp", "webp"),
    ];
}

pub mod intervals {
    use std::time::Duration;

    pub const BUCKET_RETRY_DELAY: Duration = Duration::from_secs(2);

    pub const BUCKET_RETRY_ATTEMPTS: u32 = 10;
}
