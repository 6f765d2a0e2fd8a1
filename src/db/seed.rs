//! Sample catalog data for local development.

use chrono::{Duration, Utc};
use color_eyre::Result;
use tracing::info;

use super::Database;
use crate::catalog::{Category, NewProduct};

const IMAGES: [&str; 5] = [
  "https://images.unsplash.com/photo-1593642632823-8f785ba67e45?w=800&h=600&fit=crop&crop=center",
  "https://images.unsplash.com/photo-1581094794329-c8112a89af12?w=800&h=600&fit=crop&crop=center",
  "https://images.unsplash.com/photo-1522202176988-66273c2fd55f?w=800&h=600&fit=crop&crop=center",
  "https://images.unsplash.com/photo-1558618666-fcd25c85cd64?w=800&h=600&fit=crop&crop=center",
  "https://images.unsplash.com/photo-1518709268805-4e9042af2176?w=800&h=600&fit=crop&crop=center",
];

/// Titles and one-line descriptions per category
fn samples(category: Category) -> &'static [(&'static str, &'static str)] {
  match category {
    Category::Ifp50 => &[
      ("IFP50-55 Interactive Display", "55-inch 4K touch display for classrooms and meeting rooms."),
      ("IFP50-65 Professional Series", "65-inch display with wide viewing angles for conference rooms."),
      ("IFP50-75 Education Edition", "75-inch display bundled with collaborative lesson tools."),
      ("IFP50-86 Ultra Large Format", "86-inch display for lobbies, museums and exhibition halls."),
    ],
    Category::Ifp51 => &[
      ("IFP51-65 Enterprise Display", "65-inch enterprise display with centralized device management."),
      ("IFP51-86 Ultra Premium", "86-inch display with advanced collaboration features."),
    ],
    Category::Ifp52 => &[
      ("IFP52-75 Executive Premium", "75-inch executive display with hardened security."),
      ("IFP52-86 Quantum Elite", "86-inch display for innovation centers and labs."),
    ],
    Category::Ifp62 => &[
      ("IFP62-85 Executive Elite", "85-inch flagship display for boardrooms."),
      ("IFP62-98 Presidential Elite", "98-inch flagship display for executive suites."),
    ],
    Category::Rk3588 => &[("RK3588 Android Module", "Octa-core RK3588 board for interactive panels.")],
    Category::Adv311d2 => &[("ADV311D2 Enterprise Board", "Amlogic 311D2 board for enterprise panels.")],
    Category::T982 => &[("T982 Professional Board", "T982 quad-core board with 4K output.")],
    Category::Adv100 => &[("ADV100 Entry Board", "Entry-level board for education panels.")],
    Category::IwbS82 => &[("IWBS82 Smart Whiteboard", "82-inch ceramic whiteboard with touch frame.")],
    Category::IwbP82 => &[("IWBP82 Projection Whiteboard", "82-inch projection whiteboard.")],
    Category::SmartBlackboardM86 => &[("Smart Blackboard M86", "86-inch blackboard with center touch display.")],
    Category::SmartBlackboardM86Lb => &[("Smart Blackboard M86LB", "86-inch blackboard with lifting bracket.")],
    Category::SmartTouchTable => &[("Smart Touch Table 43", "43-inch multi-touch table for retail.")],
    Category::SmartLiftingTouchTable => &[("Smart Lifting Touch Table 55", "55-inch touch table with motorized tilt.")],
    Category::SmartTvLts => &[("Smart TV LTS 65", "65-inch commercial TV with long-term support.")],
    Category::FloorKiosk => &[("Floor Kiosk 55", "55-inch free-standing wayfinding kiosk.")],
    Category::PortablePanel => &[("Portable Panel 32", "32-inch battery powered portable display.")],
    Category::MeetingPod => &[("Meeting Pod Duo", "Acoustic two-person meeting booth.")],
    Category::TvStand => &[("Mobile TV Stand 100", "Height adjustable mobile trolley up to 100 inches.")],
    Category::Ops => &[("OPS Module i7", "Open Pluggable Specification PC with Intel i7.")],
  }
}

/// Populate the catalog. Does nothing if products already exist unless
/// `force` is set, which wipes the table first. Returns the number of
/// inserted products.
pub fn seed(db: &Database, force: bool) -> Result<usize> {
  let existing = db.count()?;
  if existing > 0 {
    if !force {
      info!(existing, "Catalog already seeded, skipping");
      return Ok(0);
    }
    info!(existing, "Clearing existing products");
    db.clear()?;
  }

  let base = Utc::now() - Duration::days(30);
  let mut inserted = 0;

  for category in Category::ALL {
    for (i, (title, description)) in samples(category).iter().enumerate() {
      let product = NewProduct::new(title, description, IMAGES[i % IMAGES.len()]);
      db.insert_product_at(category, &product, base + Duration::hours(inserted as i64))?;
      inserted += 1;
    }
    info!(category = %category, "Seeded {}", category.series());
  }

  info!(inserted, "Catalog seeding complete");
  Ok(inserted)
}
