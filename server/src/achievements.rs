use rust_decimal::Decimal;
use xrpact_storage::models::user::UserRow;

/// What a user must have reached before an achievement can be claimed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Requirement {
    Donations(i64),
    TotalDonatedXrp(i64),
    Xp(i64),
}

impl Requirement {
    pub fn met_by(&self, user: &UserRow) -> bool {
        match *self {
            Requirement::Donations(count) => user.donation_count >= count,
            Requirement::TotalDonatedXrp(units) => user.total_donated >= Decimal::from(units),
            Requirement::Xp(points) => user.xp >= points,
        }
    }
}

/// One entry of the achievement catalog. The image lands in the minted
/// token's metadata, not in any served asset.
pub struct Achievement {
    pub key: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub image: &'static str,
    pub requirement: Requirement,
}

pub const ACHIEVEMENTS: &[Achievement] = &[
    Achievement {
        key: "first_donation",
        title: "First Donation",
        description: "Made your first donation on XRPact",
        image: "/achievements/first_donation.png",
        requirement: Requirement::Donations(1),
    },
    Achievement {
        key: "regular_donor",
        title: "Regular Donor",
        description: "Made 5 donations on XRPact",
        image: "/achievements/regular_donor.png",
        requirement: Requirement::Donations(5),
    },
    Achievement {
        key: "veteran_supporter",
        title: "Veteran Supporter",
        description: "Made 20 donations on XRPact",
        image: "/achievements/veteran_supporter.png",
        requirement: Requirement::Donations(20),
    },
    Achievement {
        key: "big_supporter",
        title: "Big Supporter",
        description: "Donated 100 XRP total on XRPact",
        image: "/achievements/big_supporter.png",
        requirement: Requirement::TotalDonatedXrp(100),
    },
    Achievement {
        key: "philanthropist",
        title: "Philanthropist",
        description: "Donated 500 XRP total on XRPact",
        image: "/achievements/philanthropist.png",
        requirement: Requirement::TotalDonatedXrp(500),
    },
    Achievement {
        key: "xp_master",
        title: "XP Master",
        description: "Earned 1000 XP on XRPact",
        image: "/achievements/xp_master.png",
        requirement: Requirement::Xp(1000),
    },
];

pub fn find(key: &str) -> Option<&'static Achievement> {
    ACHIEVEMENTS.iter().find(|achievement| achievement.key == key)
}
