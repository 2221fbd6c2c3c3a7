//! Overlap removal for vertically stacked labels.
//!
//! Labels whose boxes overlap are grouped into domains. Every domain is laid
//! out as one contiguous block centered on the weighted midpoint of its
//! members' anchors, clamped into the available bounds. Domains that run into
//! a neighbor absorb it and are laid out again.

use serde::{Deserialize, Serialize};

use crate::core::Rect;

/// Vertical order of label indices on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LabelOrder {
    /// Index 0 is drawn at the top (timeline rows, reversed funnels).
    #[default]
    TopToBottom,
    /// Index 0 is drawn at the bottom (pyramids).
    BottomToTop,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelInput {
    /// Vertical center of the element the label belongs to.
    pub anchor_y: f64,
    pub height: f64,
    pub offset_y: f64,
    pub enabled: bool,
    /// Hover forces a disabled label to take part in the layout.
    pub hovered: bool,
}

impl LabelInput {
    #[must_use]
    pub fn new(anchor_y: f64, height: f64) -> Self {
        Self {
            anchor_y,
            height,
            offset_y: 0.0,
            enabled: true,
            hovered: false,
        }
    }

    #[must_use]
    pub fn with_offset(mut self, offset_y: f64) -> Self {
        self.offset_y = offset_y;
        self
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.enabled || self.hovered
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelPlacement {
    pub index: usize,
    /// Resolved vertical center before `offset_y` is applied.
    pub center_y: f64,
    pub visible: bool,
    /// Domain the label was grouped into, if any.
    pub domain: Option<usize>,
}

impl LabelPlacement {
    #[must_use]
    pub fn top(&self, input: &LabelInput) -> f64 {
        self.center_y - input.height / 2.0 + input.offset_y
    }
}

#[derive(Debug, Clone, Default)]
struct Domain {
    labels: Vec<usize>,
    alive: bool,
}

/// Groups overlapping labels and repositions them without reordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LabelDomainResolver {
    pub order: LabelOrder,
}

struct Pass<'a> {
    labels: &'a [LabelInput],
    bounds: Rect,
    order: LabelOrder,
    centers: Vec<f64>,
    domains: Vec<Domain>,
    member_of: Vec<Option<usize>>,
}

impl LabelDomainResolver {
    #[must_use]
    pub fn new(order: LabelOrder) -> Self {
        Self { order }
    }

    #[must_use]
    pub fn resolve(self, labels: &[LabelInput], bounds: Rect) -> Vec<LabelPlacement> {
        let mut pass = Pass {
            labels,
            bounds,
            order: self.order,
            centers: labels.iter().map(|label| label.anchor_y).collect(),
            domains: Vec::new(),
            member_of: vec![None; labels.len()],
        };
        pass.build_domains();

        let mut domain_id = 0;
        while domain_id < pass.domains.len() {
            if pass.domains[domain_id].alive {
                pass.recalculate(domain_id);
            }
            domain_id += 1;
        }

        labels
            .iter()
            .enumerate()
            .map(|(index, label)| LabelPlacement {
                index,
                center_y: pass.centers[index],
                visible: label.is_visible(),
                domain: pass.member_of[index].filter(|&id| pass.domains[id].alive),
            })
            .collect()
    }
}

impl Pass<'_> {
    fn top_of(&self, index: usize) -> f64 {
        let label = &self.labels[index];
        self.centers[index] - label.height / 2.0 + label.offset_y
    }

    fn bottom_of(&self, index: usize) -> f64 {
        self.top_of(index) + self.labels[index].height
    }

    fn next_visible(&self, index: usize) -> Option<usize> {
        (index + 1..self.labels.len()).find(|&i| self.labels[i].is_visible())
    }

    fn previous_visible(&self, index: usize) -> Option<usize> {
        (0..index).rev().find(|&i| self.labels[i].is_visible())
    }

    fn new_domain(&mut self, labels: Vec<usize>) -> usize {
        let id = self.domains.len();
        for &label in &labels {
            self.member_of[label] = Some(id);
        }
        self.domains.push(Domain {
            labels,
            alive: true,
        });
        self.sort_domain(id);
        id
    }

    /// Keeps domain members in on-screen top-to-bottom order.
    fn sort_domain(&mut self, id: usize) {
        let labels = &mut self.domains[id].labels;
        match self.order {
            LabelOrder::TopToBottom => labels.sort_unstable(),
            LabelOrder::BottomToTop => labels.sort_unstable_by(|a, b| b.cmp(a)),
        }
    }

    fn add_to_domain(&mut self, id: usize, label: usize) {
        self.domains[id].labels.push(label);
        self.member_of[label] = Some(id);
        self.sort_domain(id);
    }

    fn build_domains(&mut self) {
        let count = self.labels.len();
        let height_total: f64 = self
            .labels
            .iter()
            .filter(|label| label.is_visible())
            .map(|label| label.height)
            .sum();

        if height_total >= self.bounds.height {
            let all: Vec<usize> = (0..count).filter(|&i| self.labels[i].is_visible()).collect();
            if !all.is_empty() {
                self.new_domain(all);
            }
            return;
        }

        for step in 0..count.saturating_sub(1) {
            let (upper, lower) = match self.order {
                LabelOrder::TopToBottom => (step, self.next_visible(step)),
                LabelOrder::BottomToTop => {
                    let index = count - 1 - step;
                    (index, self.previous_visible(index))
                }
            };
            if !self.labels[upper].is_visible() {
                continue;
            }
            let Some(lower) = lower else {
                continue;
            };

            if self.top_of(lower) <= self.bottom_of(upper) {
                match self.member_of[upper] {
                    Some(id) => self.add_to_domain(id, lower),
                    None => {
                        self.new_domain(vec![upper, lower]);
                    }
                }
            }
        }
    }

    fn recalculate(&mut self, id: usize) {
        let members = self.domains[id].labels.clone();
        if members.len() < 2 {
            self.dissolve(id);
            return;
        }

        let anchor = |index: usize| self.labels[index].anchor_y + self.labels[index].offset_y;
        let mut h1 = self.labels[members[0]].height;
        let mut y1 = anchor(members[0]);
        let mut domain_top = y1 - h1 / 2.0;
        for &member in &members[1..] {
            let h2 = self.labels[member].height;
            let y2 = anchor(member);
            domain_top = 0.25 * (-3.0 * h1 - h2 + 2.0 * y1 + 2.0 * y2);
            y1 = 0.25 * (2.0 * y1 + 2.0 * y2 - h1 + h2);
            h1 += h2;
        }

        let domain_height: f64 = members.iter().map(|&m| self.labels[m].height).sum();
        if domain_top + domain_height > self.bounds.bottom() {
            domain_top = self.bounds.bottom() - domain_height;
        }
        if domain_top < self.bounds.top {
            domain_top = self.bounds.top;
        }

        self.apply(&members, domain_top);

        // Members are sorted top-to-bottom; the highest index sits at the end
        // for top-to-bottom order and at the front otherwise.
        let (edge, neighbor) = match self.order {
            LabelOrder::TopToBottom => {
                let edge = members[members.len() - 1];
                (edge, self.next_visible(edge))
            }
            LabelOrder::BottomToTop => {
                let edge = members[0];
                (edge, self.next_visible(edge))
            }
        };
        let Some(neighbor) = neighbor else {
            return;
        };

        let overlaps = match self.order {
            LabelOrder::TopToBottom => self.top_of(neighbor) < self.bottom_of(edge),
            LabelOrder::BottomToTop => self.top_of(edge) < self.bottom_of(neighbor),
        };
        if !overlaps {
            return;
        }

        let neighbor_domain = self.member_of[neighbor]
            .filter(|&other| other != id && self.domains[other].alive);
        match neighbor_domain {
            Some(other) => {
                let merged = self.merge(other, id);
                self.recalculate(merged);
            }
            None => {
                self.add_to_domain(id, neighbor);
                self.recalculate(id);
            }
        }
    }

    fn apply(&mut self, members: &[usize], domain_top: f64) {
        let mut height_sum = 0.0;
        let mut offset_sum = 0.0;
        let mut previous: Option<usize> = None;
        for &member in members {
            let label = self.labels[member];
            let mut center = domain_top + height_sum + offset_sum + label.height / 2.0;
            if let Some(prev) = previous {
                let prev_label = self.labels[prev];
                let prev_bottom = self.centers[prev] + prev_label.height / 2.0 + prev_label.offset_y;
                let current_top = center - label.height / 2.0 + label.offset_y;
                if current_top < prev_bottom {
                    center += prev_bottom - current_top;
                }
            }
            self.centers[member] = center;
            height_sum += label.height;
            offset_sum += label.offset_y;
            previous = Some(member);
        }
    }

    /// Moves `source` members into `target`, concatenated in screen order.
    fn merge(&mut self, target: usize, source: usize) -> usize {
        let target_first = self.domains[target].labels[0];
        let source_first = self.domains[source].labels[0];
        let source_labels = std::mem::take(&mut self.domains[source].labels);
        self.domains[source].alive = false;
        for &label in &source_labels {
            self.member_of[label] = Some(target);
        }

        let target_first_in_list =
            (self.order == LabelOrder::TopToBottom) == (target_first < source_first);
        let target_labels = std::mem::take(&mut self.domains[target].labels);
        self.domains[target].labels = if target_first_in_list {
            target_labels.into_iter().chain(source_labels).collect()
        } else {
            source_labels.into_iter().chain(target_labels).collect()
        };
        target
    }

    fn dissolve(&mut self, id: usize) {
        self.domains[id].alive = false;
        for label in std::mem::take(&mut self.domains[id].labels) {
            if self.member_of[label] == Some(id) {
                self.member_of[label] = None;
            }
        }
    }
}
