use crate::dataset::{DemographicRow, LinkedInPost};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

pub const CATEGORIES: [&str; 4] = ["industry", "seniority", "company_size", "location"];
const TOP_BUCKETS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemographicShare {
    pub name: String,
    pub pct: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Demographics {
    pub industry: Vec<DemographicShare>,
    pub seniority: Vec<DemographicShare>,
    pub company_size: Vec<DemographicShare>,
    pub location: Vec<DemographicShare>,
}

impl Demographics {
    fn category_mut(&mut self, category: &str) -> Option<&mut Vec<DemographicShare>> {
        match category {
            "industry" => Some(&mut self.industry),
            "seniority" => Some(&mut self.seniority),
            "company_size" => Some(&mut self.company_size),
            "location" => Some(&mut self.location),
            _ => None,
        }
    }

    pub fn category(&self, category: &str) -> &[DemographicShare] {
        match category {
            "industry" => &self.industry,
            "seniority" => &self.seniority,
            "company_size" => &self.company_size,
            "location" => &self.location,
            _ => &[],
        }
    }
}

#[derive(Debug)]
struct Bucket {
    category: String,
    name: String,
    pct_sum: f64,
    posts: usize,
}

/// Averages each `(category, value)` bucket over the posts selected for the
/// window, rescales to 0-100 and keeps the five largest per category.
pub fn summarize(rows: &[DemographicRow], posts: &[LinkedInPost]) -> Demographics {
    let selected_posts = posts
        .iter()
        .map(|post| post.url.as_str())
        .collect::<HashSet<_>>();

    // A post measured twice for the same bucket keeps its last snapshot.
    let mut snapshot_index: HashMap<(&str, String, &str), usize> = HashMap::new();
    let mut snapshots: Vec<(String, &str, f64)> = Vec::new();

    for row in rows
        .iter()
        .filter(|row| selected_posts.contains(row.post_url.as_str()))
    {
        let category = normalize_category(&row.category);
        if !CATEGORIES.contains(&category.as_str()) {
            continue;
        }

        let key = (row.post_url.as_str(), category.clone(), row.value.as_str());
        match snapshot_index.get(&key) {
            Some(&position) => snapshots[position].2 = row.pct,
            None => {
                snapshot_index.insert(key, snapshots.len());
                snapshots.push((category, row.value.as_str(), row.pct));
            }
        }
    }

    let mut bucket_index: HashMap<(String, &str), usize> = HashMap::new();
    let mut buckets: Vec<Bucket> = Vec::new();

    for (category, name, pct) in snapshots {
        let key = (category.clone(), name);
        let position = *bucket_index.entry(key).or_insert_with(|| {
            buckets.push(Bucket {
                category,
                name: name.to_string(),
                pct_sum: 0.0,
                posts: 0,
            });
            buckets.len() - 1
        });

        buckets[position].pct_sum += pct;
        buckets[position].posts += 1;
    }

    let mut demographics = Demographics::default();
    for bucket in buckets {
        let average = bucket.pct_sum / bucket.posts as f64;
        if let Some(shares) = demographics.category_mut(&bucket.category) {
            shares.push(DemographicShare {
                name: bucket.name,
                pct: average * 100.0,
            });
        }
    }

    for category in CATEGORIES {
        if let Some(shares) = demographics.category_mut(category) {
            shares.sort_by(|left, right| right.pct.total_cmp(&left.pct));
            shares.truncate(TOP_BUCKETS);
        }
    }

    demographics
}

pub fn normalize_category(raw: &str) -> String {
    raw.trim().to_lowercase().replace(' ', "_")
}
