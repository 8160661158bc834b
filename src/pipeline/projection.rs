use futures::stream::{Stream, TryStreamExt};

use crate::domain::product::Product;

/// Returns `product` with its name upper-cased; every other field is kept.
pub fn upper_case_name(mut product: Product) -> Product {
    product.name = product.name.to_uppercase();
    product
}

/// Upper-cases the name of every record flowing past.
///
/// One record in, one record out, in order, holding at most the record being
/// transformed. Errors are forwarded untouched.
pub fn upper_case_names<S, E>(upstream: S) -> impl Stream<Item = Result<Product, E>>
where
    S: Stream<Item = Result<Product, E>>,
{
    upstream.map_ok(upper_case_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{ProductId, ProductName, ProductPrice};
    use futures::stream::{self, StreamExt};

    fn product(id: &str, name: &str) -> Product {
        Product {
            id: ProductId::new(id).unwrap(),
            name: ProductName::new(name).unwrap(),
            price: ProductPrice::new(1.5).unwrap(),
            created_at: None,
            category: None,
            picture: None,
        }
    }

    #[tokio::test]
    async fn preserves_order_and_other_fields() {
        let input = vec![product("1", "TV LG 4k"), product("2", "Apple watch")];

        let output: Vec<Product> = upper_case_names(stream::iter(input.into_iter().map(Ok::<_, ()>)))
            .try_collect()
            .await
            .unwrap();

        assert_eq!(output[0].id, "1");
        assert_eq!(output[0].name, "TV LG 4K");
        assert_eq!(output[1].id, "2");
        assert_eq!(output[1].name, "APPLE WATCH");
        assert_eq!(output[1].price, 1.5);
    }

    #[tokio::test]
    async fn is_idempotent() {
        let once: Vec<Product> =
            upper_case_names(stream::iter(vec![Ok::<_, ()>(product("1", "Laptop Lenovo"))]))
                .try_collect()
                .await
                .unwrap();
        let twice: Vec<Product> = upper_case_names(stream::iter(once.clone().into_iter().map(Ok::<_, ()>)))
            .try_collect()
            .await
            .unwrap();

        assert_eq!(once, twice);
    }

    #[tokio::test]
    async fn forwards_errors_in_position() {
        let input = vec![Ok(product("1", "a")), Err("broken"), Ok(product("2", "b"))];

        let output: Vec<Result<Product, &str>> =
            upper_case_names(stream::iter(input)).collect().await;

        assert_eq!(output.len(), 3);
        assert_eq!(output[0].as_ref().unwrap().name, "A");
        assert_eq!(output[1].as_ref().unwrap_err(), &"broken");
        assert_eq!(output[2].as_ref().unwrap().name, "B");
    }
}
