/// Arithmetic mean of the ratings, or 0 when there are none.
pub fn average_rating(ratings: impl IntoIterator<Item = i32>) -> f64 {
    let (sum, count) = ratings
        .into_iter()
        .fold((0i64, 0u64), |(sum, count), r| (sum + r as i64, count + 1));

    if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    }
}

pub fn rating_in_range(rating: i32) -> bool {
    (1..=5).contains(&rating)
}
