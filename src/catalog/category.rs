//! Typed product categories.
//!
//! Every product belongs to exactly one category. The category decides the
//! API route that serves it, the page it is shown on and the series label
//! used in listings.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Top-level product line a category belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryGroup {
  InteractiveDisplay,
  Ifpd,
  SmartSolutions,
  Accessories,
}

impl CategoryGroup {
  pub const ALL: [CategoryGroup; 4] = [
    CategoryGroup::InteractiveDisplay,
    CategoryGroup::Ifpd,
    CategoryGroup::SmartSolutions,
    CategoryGroup::Accessories,
  ];

  /// Path segment under `/api`
  pub fn api_segment(&self) -> &'static str {
    match self {
      CategoryGroup::InteractiveDisplay => "interactive-display",
      CategoryGroup::Ifpd => "ifpd",
      CategoryGroup::SmartSolutions => "smart-solutions",
      CategoryGroup::Accessories => "accessories",
    }
  }

  /// Path segment of the marketing page
  pub fn page_segment(&self) -> &'static str {
    match self {
      CategoryGroup::InteractiveDisplay => "interactive-displays",
      CategoryGroup::Ifpd => "ifpd",
      CategoryGroup::SmartSolutions => "smart-solutions",
      CategoryGroup::Accessories => "accessories",
    }
  }

  pub fn from_api_segment(segment: &str) -> Option<Self> {
    Self::ALL
      .into_iter()
      .find(|g| g.api_segment() == segment)
  }
}

/// A product category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
  // Interactive displays
  Ifp50,
  Ifp51,
  Ifp52,
  Ifp62,

  // IFPD
  Rk3588,
  Adv311d2,
  T982,
  Adv100,
  IwbS82,
  IwbP82,

  // Smart solutions
  SmartBlackboardM86,
  SmartBlackboardM86Lb,
  SmartTouchTable,
  SmartLiftingTouchTable,
  SmartTvLts,

  // Accessories
  FloorKiosk,
  PortablePanel,
  MeetingPod,
  TvStand,
  Ops,
}

/// Returned when a slug or route does not name a known category.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown product category: {0}")]
pub struct UnknownCategory(pub String);

impl Category {
  /// All categories in catalogue order.
  pub const ALL: [Category; 20] = [
    Category::Ifp50,
    Category::Ifp51,
    Category::Ifp52,
    Category::Ifp62,
    Category::Rk3588,
    Category::Adv311d2,
    Category::T982,
    Category::Adv100,
    Category::IwbS82,
    Category::IwbP82,
    Category::SmartBlackboardM86,
    Category::SmartBlackboardM86Lb,
    Category::SmartTouchTable,
    Category::SmartLiftingTouchTable,
    Category::SmartTvLts,
    Category::FloorKiosk,
    Category::PortablePanel,
    Category::MeetingPod,
    Category::TvStand,
    Category::Ops,
  ];

  pub fn group(&self) -> CategoryGroup {
    use Category::*;
    match self {
      Ifp50 | Ifp51 | Ifp52 | Ifp62 => CategoryGroup::InteractiveDisplay,
      Rk3588 | Adv311d2 | T982 | Adv100 | IwbS82 | IwbP82 => CategoryGroup::Ifpd,
      SmartBlackboardM86 | SmartBlackboardM86Lb | SmartTouchTable | SmartLiftingTouchTable
      | SmartTvLts => CategoryGroup::SmartSolutions,
      FloorKiosk | PortablePanel | MeetingPod | TvStand | Ops => CategoryGroup::Accessories,
    }
  }

  /// Route slug, also the value stored in the database.
  pub fn slug(&self) -> &'static str {
    match self {
      Category::Ifp50 => "ifp50-series",
      Category::Ifp51 => "ifp51-series",
      Category::Ifp52 => "ifp52-series",
      Category::Ifp62 => "ifp62-series",
      Category::Rk3588 => "rk3588",
      Category::Adv311d2 => "adv311d2",
      Category::T982 => "t982",
      Category::Adv100 => "adv100",
      Category::IwbS82 => "iwb-s82",
      Category::IwbP82 => "iwb-p82",
      Category::SmartBlackboardM86 => "smart-blackboard-m86",
      Category::SmartBlackboardM86Lb => "smart-blackboard-m86lb",
      Category::SmartTouchTable => "smart-touch-table",
      Category::SmartLiftingTouchTable => "smart-lifting-touch-table",
      Category::SmartTvLts => "smart-tv-lts",
      Category::FloorKiosk => "floor-kiosk",
      Category::PortablePanel => "portable-panel",
      Category::MeetingPod => "meeting-pod",
      Category::TvStand => "tv-stand",
      Category::Ops => "ops",
    }
  }

  /// Marketing series label.
  pub fn series(&self) -> &'static str {
    match self {
      Category::Ifp50 => "IFP50 Series",
      Category::Ifp51 => "IFP51 Series",
      Category::Ifp52 => "IFP52 Series",
      Category::Ifp62 => "IFP62 Elite Series",
      Category::Rk3588 => "RK3588 Elite Series",
      Category::Adv311d2 => "ADV311D2 Enterprise Series",
      Category::T982 => "T982 Professional Series",
      Category::Adv100 => "ADV100 Series",
      Category::IwbS82 => "IWBS82 Series",
      Category::IwbP82 => "IWBP82 Series",
      Category::SmartBlackboardM86 => "SmartBlackboardM86 Series",
      Category::SmartBlackboardM86Lb => "M86LB Series",
      Category::SmartTouchTable => "SmartTouchTable Series",
      Category::SmartLiftingTouchTable => "SmartLiftingTouchTable Series",
      Category::SmartTvLts => "SmartTVLTS Series",
      Category::FloorKiosk => "Floor Kiosk Series",
      Category::PortablePanel => "Portable Panel Series",
      Category::MeetingPod => "Meeting Pod Series",
      Category::TvStand => "TV Stand Series",
      Category::Ops => "OPS Series",
    }
  }

  /// Key used for this category in the aggregated `/api/products/all`
  /// response.
  pub fn listing_key(&self) -> &'static str {
    match self {
      Category::Ifp50 => "IFP50 Series",
      Category::Ifp51 => "IFP51 Series",
      Category::Ifp52 => "IFP52 Series",
      Category::Ifp62 => "IFP62 Series",
      Category::Rk3588 => "RK3588 Series",
      Category::Adv311d2 => "ADV311D2 Series",
      Category::T982 => "T982 Series",
      Category::Adv100 => "ADV100 Series",
      Category::IwbS82 => "IWBS82 Series",
      Category::IwbP82 => "IWBP82 Series",
      Category::SmartBlackboardM86 => "SmartBlackboardM86 Series",
      Category::SmartBlackboardM86Lb => "SmartBlackboardM86LB Series",
      Category::SmartTouchTable => "SmartTouchTable Series",
      Category::SmartLiftingTouchTable => "SmartLiftingTouchTable Series",
      Category::SmartTvLts => "SmartTVLTS Series",
      Category::FloorKiosk => "Floor Kiosk Series",
      Category::PortablePanel => "Portable Panel Series",
      Category::MeetingPod => "Meeting Pod Series",
      Category::TvStand => "TV Stand Series",
      Category::Ops => "OPS Series",
    }
  }

  /// JSON endpoint serving this category.
  pub fn api_path(&self) -> String {
    format!("/api/{}/{}", self.group().api_segment(), self.slug())
  }

  /// Marketing page showing this category.
  pub fn page_path(&self) -> String {
    // Whiteboard pages drop the dash the API slug carries
    let slug = match self {
      Category::IwbS82 => "iwbs82",
      Category::IwbP82 => "iwbp82",
      other => other.slug(),
    };
    format!("/{}/{}", self.group().page_segment(), slug)
  }

  /// Resolve `/api/{group}/{slug}` segments.
  pub fn from_api_segments(group: &str, slug: &str) -> Result<Self, UnknownCategory> {
    let group = CategoryGroup::from_api_segment(group)
      .ok_or_else(|| UnknownCategory(format!("{group}/{slug}")))?;
    let category: Category = slug.parse()?;
    if category.group() == group {
      Ok(category)
    } else {
      Err(UnknownCategory(format!("{}/{slug}", group.api_segment())))
    }
  }
}

impl FromStr for Category {
  type Err = UnknownCategory;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let needle = s.trim().to_lowercase();
    // Short forms used on pages and in conversation
    match needle.as_str() {
      "ifp50" => return Ok(Category::Ifp50),
      "ifp51" => return Ok(Category::Ifp51),
      "ifp52" => return Ok(Category::Ifp52),
      "ifp62" => return Ok(Category::Ifp62),
      "iwbs82" => return Ok(Category::IwbS82),
      "iwbp82" => return Ok(Category::IwbP82),
      _ => {}
    }
    Self::ALL
      .into_iter()
      .find(|c| c.slug() == needle)
      .ok_or(UnknownCategory(s.to_string()))
  }
}

impl fmt::Display for Category {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.slug())
  }
}

impl Serialize for Category {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(self.slug())
  }
}

impl<'de> Deserialize<'de> for Category {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let slug = String::deserialize(deserializer)?;
    slug.parse().map_err(de::Error::custom)
  }
}
