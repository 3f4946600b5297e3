use crate::domain::user::User;

/// Клиентская фильтрация списка пользователей: без учёта регистра,
/// по вхождению в логин или отображаемое имя. Пустой запрос возвращает
/// всю коллекцию в исходном порядке.
pub fn filter_users<'a>(users: &'a [User], term: &str) -> Vec<&'a User> {
    if term.is_empty() {
        return users.iter().collect();
    }

    let needle = term.to_lowercase();
    users
        .iter()
        .filter(|user| {
            user.username.to_lowercase().contains(&needle)
                || user.name.to_lowercase().contains(&needle)
        })
        .collect()
}
